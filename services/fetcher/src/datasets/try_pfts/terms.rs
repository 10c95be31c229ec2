//! Growth-form vocabulary for each plant functional type, lowercase.

pub const TREE: &[&str] = &[
    "tree", "trees", "t", "seedling", "seedlings", "sapling", "saplings", "small tree",
    "small_tree", "large tree", "tree-like", "tre", "treen", "canopy tree", "canopy_tree",
    "top.canopy.tree", "top canopy", "mid canopy", "mid.canopy.tree", "midtree",
    "understory tree", "understory", "midstory", "treelet", "tree/treelet", "conifer",
    "conifers", "gymnosperm", "gymn", "angiosperm", "angwood", "palm", "pam", "palm tree",
    "palmtree", "canopy_palm", "understory_palm", "palm (p)", "palm resp. palm",
    "tree (deciduous)", "tree (evergreen)", "woody deciduous", "woody evergreen",
    "deciduous shrub or tree", "evergreen shrub or tree", "semi deciduous tree or shrub",
    "tree fern", "treefern", "tree_fern", "arborescent_fern", "tree_", "t (treefern)",
    "hardwood", "softwood", "woody plant", "woody species", "woody plants", "woody", "w",
    "mangrove", "tree/mangrove/woody", "shrub/tree/mangrove/woody", "tree/hemiepiphyte",
    "hemiepiphyte", "hemiepiphite", "hemi-epiphyte", "hemi-epipjyte", "tree/hemiepiphyte/woody",
    "columnar", "conical", "pachicaul", "tree crop", "arbol", "tree/shrub", "tree / shrub",
    "tree shrub", "shrub/tree", "shrub / tree", "tree-shrub", "tree_shrub", "shrub_tree", "t/s",
    "t/tree", "tree/tree", "tree | shrub", "shrub | tree", "tree | tree", "tree|shrub",
    "tree shrub intermediate", "tree/large shrub", "tree/shrub/climber", "smtree",
    "tree/ /woody", "tree/woody", "trees/t/tree", "t/tree/tree", "trees/shrub",
    "trees/t/tree/tree", "trees/tree", "trees/tree/tree", "trees/t", "tree v", "tree vii",
    "tree ix", "tree iv", "tree iii", "tree ii", "tree i", "tree (t)", "t resp. t", "a t", "st",
    "lt", "slt", "usforesttrees", "early-successional", "mid-successional", "late-successional",
];

pub const SHRUB: &[&str] = &[
    "shrub", "shrubs", "s", "sh", "shru", "shrub (s)", "s resp. s", "srub", "shurb", "arbusto",
    "subshrub", "sub-shrub", "sub shrub", "subshrub (woody <1m)", "sub-shrub (chamaephyte)",
    "suffrutescent", "subshurb", "dwarf shrub", "erect dwarf shrub", "prostrate dwarf shrub",
    "evergreen dwarf shrub", "drwarf shrub", "dwarf shrub community", "dwarf semishrub",
    "small shrub", "small_shrub", "large shrub", "low to high shrub", "arborescent shrubs",
    "chamaephyte", "chaemaephyte", "nano-chamaephyte", "shrub (chamaephyte)",
    "chaemaephyte | shrub", "shrub | chaemaephyte", "chaemaephyte | nano-chamaephyte",
    "chaemaephyte | vine", "chasmophyte", "woody shrub", "shrub/woody", "shrub (woody 1-4m)",
    "mallee", "vine", "v", "vines", "woody vine", "herbaceous vine", "liana/woody vine",
    "liana/woody vine|shrub", "climbing vine", "climbing_vine", "scandent_vine",
    "trailing_vine", "herbaceous vine|herb", "vine|herb", "herbaceous vine|liana/woody vine",
    "vine resp. climb", "shrub/vine", "w climb resp. v", "climb resp. v", "climb resp. climb",
    "liana", "lianas", "l", "lian", "lianna", "woody liana", "l/woody liana",
    "lianas/lianna/woody liana", "lianas/woody liana", "lianas and climbers", "lianas/climber",
    "lianas/lianna", "lianas (wody climbers)", "climber", "climb", "climbing",
    "climber or creeper", "creeper", "climber/vine", "climber/liana", "climber/non-woody",
    "climber/woody", "climber/non-woody/woody", "twiner/climber.", "twiner/climber",
    "climber/palmoid/woody", "epiphyte", "epiphytic", "epiphytes", "ep", "e", "epiphyte (e)",
    "epiphyte (mistletoe)", "epiphytic herb", "epiphytic_herb", "epiphyte_herb", "hemiepiphyte",
    "hemiepiphytes", "hemi-epiphyte", "epiphyte/hemiepiphyte", "parasite", "hemi-parasite",
    "hemiparasite", "hemi-parasitic", "stem parasite", "root parasite", "woody parasite",
    "parasitic climber", "holoparasitic", "mistletoe", "parasite_epiphyte", "succulent",
    "succulents", "succulent leaves", "succulent stems", "stem succulent", "leaf succulent",
    "rosette leaf succulent", "tall stem succulent", "stem and leaf succulent",
    "forb-succulent", "l succ", "i succ", "caudiciform", "cactus", "cacti", "cact", "cacti (c)",
    "agaves&cacti", "agaves&cacti resp. agaves&cacti", "carnivore", "carnivorous",
    "carnivorous plant", "carnivorous plant resp. carnivorous plant", "cushion",
    "cushion plant", "cushion forming", "mat forming", "mat-forming", "aquatic",
    "shrub/aquatic", "aquatic plants, submerged", "aquatic plants, floating", "semi-aquatic",
    "subaquatic", "aquatic/semi-aquatic", "stem erect", "erect", "stem ascending to prostrate",
    "ascending", "stem prostrate", "prostrate", "decumbent", "trailing", "semi-erect",
    "always climbing using tendrils", "always trailing", "always spread climbing",
    "always climbing using adhesive roots", "sometimes spread climbing", "trailing_herb",
    "trailing_herbaceous_vine", "trailing_plant", "terrestrial_trailing_plant",
    "thicket forming", "bunch", "colonizing", "multiple stems", "multi-stem", "multiple stem",
    "single stem", "single stem or multi stemed", "branchy", "ros", "rosette", "scap",
    "scapose", "caesp", "caespitose", "rept", "reptant", "stoloniferous", "rhizomatous", "rhiz",
    "shrub/tree", "tree/shrub", "tree / shrub", "shrub / tree", "shrub_tree", "tree_shrub",
    "shrub/tree intermediate", "shrub | tree", "tree | shrub", "shrub|tree", "tree|shrub",
    "terrestrial_shrub", "shrubland", "shrub forest belt", "shrub, subshrub",
    "shrubs and sub-shrubs", "shrub/parasite", "halfshrubs resp. s", "shrub-like_clumps",
    "shrub-like_herb", "se", "rus", "desert sub-shrubs", "free", "free-standing",
    "climber/epiphyte", "climber/epiphyte/parasitic", "climber/epiphyte/succulent",
    "climber/fern", "climber/hemiepiphyte", "climber/herb", "climber/succulent",
    "climber/free/liana", "climber/free/shrub", "climber/free/understory", "climber/free/vine",
    "climber/parasitic", "climbing_epiphyte", "climibing_herb",
];

pub const GRASS: &[&str] = &[
    "herb", "herbs", "herb.", "herb (h)", "h", "herbaceous", "herbaceous monocot",
    "herbaceous dicot", "herbaceous dicotyl", "herbaceous monocotyl", "herbaceous forb",
    "herbaceous legume", "herbaceous plant", "herbaceous/terrestrial herb", "terrestrial herb",
    "terrestrial_herb", "angherb", "herb_erect", "hierba_", "forb", "forbs", "forb/herb",
    "frobs", "annual forb", "perennial forb", "variable forb", "leguminous forb", "forb-annual",
    "forb-biennial", "graminoid", "graminoids", "gram", "gras", "grass", "grasses", "g",
    "grass (poaceae only)", "c3 grass", "c4 grass", "c3.sedges", "grass (clonal)",
    "grass (tussock)", "tuss", "forage grass", "pasture grass", "prairie grass", "woody grass",
    "annual grass", "perennial grass", "annual graminoid", "perennial graminoid",
    "variable graminoid", "graminoid-annual", "bunchgrasses", "rhizome grass", "sedge", "seges",
    "grasses&sedges", "g&s", "g&s resp. g&s", "fern", "ferns", "fern ally", "fernally",
    "pteridophyte", "ferns and allies (lycophytes)", "fern or fern ally", "fern/non-woody",
    "fern/aquatic", "fern/aquatic/non-woody", "fern/woody", "fern/palmoid/woody",
    "fern/epiphyte/non-woody", "terrestrial_fern", "terrestrial fern", "clubmoss", "club moss",
    "horsetail", "lycopodiophyta", "selaginella", "moss", "turf moss", "bryophyte",
    "nonvascular", "lichen", "lichenous", "lichen/non-woody", "foliose lichen",
    "fruticose lichen", "annual", "perennial", "therophyte", "hemicryptophyte",
    "annual-biennial", "perennial herb", "perennial herb/hemicryptophyte",
    "herbaceous perennial", "annual herb", "herbaceous annual", "herbaceous annual-biennial",
    "perennial leguminous herb", "perennial grass/hemicryptophyte", "geophyte", "geop", "bulb",
    "rhizomatous", "rhiz", "rhizimatous", "rhizomatous/bulbs", "perennial, rhizomatous",
    "bamboo", "aquatic", "aquatic forb", "hydrophyte", "hydrophytes", "waterplant",
    "aquatic fresh water", "aquatic, fresh water, floating", "submerged", "amphibiousubmerged",
    "emergent attached to the substrate", "submerged attached to the substrate",
    "floating leaves attached to the substrate", "free-floating plants", "herb/aquatic",
    "herb/aquatic/non-woody", "hydrophyte-annual", "hyd", "n hyd", "macrophyte", "aquativ",
    "rosette", "rosette plant", "semi-rosette", "rosette forb", "rush", "grasslike", "legume",
    "legumes", "annual legume", "perennial legume", "cereal", "weed", "weedy", "weed, sedge",
    "grassland", "herb resp. h", "b h", "hel", "m hel", "n", "a", "hs", "hl", "ha", "hsl",
    "hst", "hslt", "hsa", "el", "crops", "crop", "extensive-stemmed herb", "small_herb_",
    "annuals",
];

/// Values recorded under the growth-form trait that describe something else.
pub const NOT_GROWTH_FORMS: &[&str] = &[
    "yes", "no", "absence", "presence", "unspecified", "?", "`", "rounded", "conical", "oval",
    "vase", "irregular", "single crown", "soli", "mult", "ss", "c+sc", "nd", "various",
];
