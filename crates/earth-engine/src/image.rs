//! Typed builders over the expression graph.
//!
//! Each method only builds a [`Value`]; nothing is sent to the server until a
//! value is computed or exported through the client.

use serde_json::json;

use crate::expr::Value;

/// A server-side image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image(Value);

/// A server-side image collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection(Value);

/// A server-side reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reducer(Value);

/// A collection filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(Value);

/// A geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(Value);

macro_rules! impl_value_wrapper {
    ($($ty:ident),+) => {
        $(
            impl $ty {
                /// Wrap an arbitrary expression.
                pub fn from_value(value: Value) -> Self {
                    Self(value)
                }

                pub fn value(&self) -> &Value {
                    &self.0
                }

                pub fn into_value(self) -> Value {
                    self.0
                }
            }

            impl From<$ty> for Value {
                fn from(wrapper: $ty) -> Value {
                    wrapper.0
                }
            }
        )+
    };
}

impl_value_wrapper!(Image, ImageCollection, Reducer, Filter, Geometry);

impl Image {
    /// `ee.Image(asset_id)`.
    pub fn load(asset_id: &str) -> Self {
        Self(Value::invoke("Image.load", [("id", Value::from(asset_id))]))
    }

    /// An image with a constant value in every pixel.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self(Value::invoke("Image.constant", [("value", value.into())]))
    }

    fn call<'a>(
        &self,
        function: &str,
        input: &'a str,
        rest: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Self {
        let arguments = std::iter::once((input, self.0.clone())).chain(rest);
        Self(Value::invoke(function, arguments))
    }

    fn binary(&self, function: &str, other: Image) -> Self {
        self.call(function, "image1", [("image2", other.0)])
    }

    pub fn select<S: AsRef<str>>(&self, bands: &[S]) -> Self {
        self.call("Image.select", "input", [("bandSelectors", Value::strings(bands))])
    }

    pub fn rename<S: AsRef<str>>(&self, names: &[S]) -> Self {
        self.call("Image.rename", "input", [("names", Value::strings(names))])
    }

    pub fn band_names(&self) -> Value {
        Value::invoke("Image.bandNames", [("image", self.0.clone())])
    }

    pub fn add_bands(&self, other: &Image) -> Self {
        self.call("Image.addBands", "dstImg", [("srcImg", other.0.clone())])
    }

    pub fn clamp(&self, low: f64, high: f64) -> Self {
        self.call(
            "Image.clamp",
            "input",
            [("low", Value::from(low)), ("high", Value::from(high))],
        )
    }

    /// Replace masked pixels with `value`.
    pub fn unmask(&self, value: f64) -> Self {
        self.call("Image.unmask", "input", [("value", Value::from(value))])
    }

    pub fn to_int16(&self) -> Self {
        self.call("Image.toInt16", "value", [])
    }

    /// `mode` is `bilinear` or `bicubic`.
    pub fn resample(&self, mode: &str) -> Self {
        self.call("Image.resample", "image", [("mode", Value::from(mode))])
    }

    /// `(first - second) / (first + second)`, as a band named `nd`.
    pub fn normalized_difference(&self, first: &str, second: &str) -> Self {
        self.call(
            "Image.normalizedDifference",
            "input",
            [("bandNames", Value::strings(&[first, second]))],
        )
    }

    pub fn update_mask(&self, mask: &Image) -> Self {
        self.call("Image.updateMask", "image", [("mask", mask.0.clone())])
    }

    pub fn right_shift(&self, bits: u32) -> Self {
        self.binary("Image.rightShift", Image::constant(bits))
    }

    pub fn bitwise_and(&self, mask: u32) -> Self {
        self.binary("Image.bitwiseAnd", Image::constant(mask))
    }

    pub fn eq(&self, value: impl Into<Value>) -> Self {
        self.binary("Image.eq", Image::constant(value))
    }

    pub fn or(&self, other: &Image) -> Self {
        self.binary("Image.or", other.clone())
    }

    pub fn and(&self, other: &Image) -> Self {
        self.binary("Image.and", other.clone())
    }

    /// The image's default projection.
    pub fn projection(&self) -> Value {
        Value::invoke("Image.projection", [("image", self.0.clone())])
    }

    /// WKT or EPSG code of the default projection.
    pub fn projection_crs(&self) -> Value {
        Value::invoke("Projection.crs", [("projection", self.projection())])
    }

    /// Affine transform of the default projection.
    pub fn projection_transform(&self) -> Value {
        Value::invoke("Projection.transform", [("projection", self.projection())])
    }

    pub fn reproject(&self, crs: &str, scale: f64) -> Self {
        let projection = Value::invoke("Projection", [("crs", Value::from(crs))]);
        self.call(
            "Image.reproject",
            "image",
            [("crs", projection), ("scale", Value::from(scale))],
        )
    }

    pub fn clip_to_bounds_and_scale(&self, scale: f64) -> Self {
        self.call("Image.clipToBoundsAndScale", "input", [("scale", Value::from(scale))])
    }
}

impl ImageCollection {
    /// `ee.ImageCollection(collection_id)`.
    pub fn load(collection_id: &str) -> Self {
        Self(Value::invoke("ImageCollection.load", [("id", Value::from(collection_id))]))
    }

    /// A collection built from a list of images.
    pub fn from_images(images: Vec<Image>) -> Self {
        let images = Value::Array(images.into_iter().map(Image::into_value).collect());
        Self(Value::invoke("ImageCollection.fromImages", [("images", images)]))
    }

    pub fn filter(&self, filter: Filter) -> Self {
        Self(Value::invoke(
            "Collection.filter",
            [("collection", self.0.clone()), ("filter", filter.0)],
        ))
    }

    /// Keep images whose `system:time_start` falls in `[start, end)`.
    pub fn filter_date(&self, start: &str, end: &str) -> Self {
        self.filter(Filter::date(start, end))
    }

    pub fn filter_bounds(&self, geometry: Geometry) -> Self {
        self.filter(Filter::bounds(geometry))
    }

    /// Apply `f` to every image.
    pub fn map(&self, f: impl FnOnce(Image) -> Image) -> Self {
        let algorithm = Value::function(|arg| f(Image(arg)).0);
        Self(Value::invoke(
            "Collection.map",
            [("collection", self.0.clone()), ("baseAlgorithm", algorithm)],
        ))
    }

    pub fn select<S: AsRef<str>>(&self, bands: &[S]) -> Self {
        let bands: Vec<String> = bands.iter().map(|b| b.as_ref().to_string()).collect();
        self.map(move |image| image.select(&bands))
    }

    pub fn first(&self) -> Image {
        Image(Value::invoke("Collection.first", [("collection", self.0.clone())]))
    }

    pub fn size(&self) -> Value {
        Value::invoke("Collection.size", [("collection", self.0.clone())])
    }

    /// The collection as a list of at most `count` elements.
    pub fn to_list(&self, count: usize) -> Value {
        Value::invoke(
            "Collection.toList",
            [("collection", self.0.clone()), ("count", Value::from(count as i64))],
        )
    }

    /// Element `index` of the collection.
    pub fn get(&self, count: usize, index: usize) -> Image {
        Image(Value::invoke(
            "List.get",
            [("list", self.to_list(count)), ("index", Value::from(index as i64))],
        ))
    }

    pub fn mean(&self) -> Image {
        Image(Value::invoke("ImageCollection.mean", [("collection", self.0.clone())]))
    }

    pub fn reduce(&self, reducer: Reducer) -> Image {
        Image(Value::invoke(
            "ImageCollection.reduce",
            [("collection", self.0.clone()), ("reducer", reducer.0)],
        ))
    }
}

impl Reducer {
    pub fn mean() -> Self {
        Self(Value::invoke("Reducer.mean", []))
    }

    pub fn percentile(percentiles: &[f64]) -> Self {
        Self(Value::invoke(
            "Reducer.percentile",
            [("percentiles", Value::Constant(json!(percentiles)))],
        ))
    }
}

impl Filter {
    pub fn date(start: &str, end: &str) -> Self {
        let range = Value::invoke(
            "DateRange",
            [("start", Value::from(start)), ("end", Value::from(end))],
        );
        Self(Value::invoke(
            "Filter.dateRangeContains",
            [("leftValue", range), ("rightField", Value::from("system:time_start"))],
        ))
    }

    pub fn bounds(geometry: Geometry) -> Self {
        Self(Value::invoke(
            "Filter.intersects",
            [("leftField", Value::from(".all")), ("rightValue", geometry.0)],
        ))
    }

    /// Keep images whose `field` (`month`, `year`, `day_of_year`, ...) lies in
    /// `start..=end`.
    pub fn calendar_range(start: u32, end: u32, field: &str) -> Self {
        Self(Value::invoke(
            "Filter.calendarRange",
            [
                ("start", Value::from(start)),
                ("end", Value::from(end)),
                ("field", Value::from(field)),
            ],
        ))
    }
}

impl Geometry {
    /// A planar rectangle in EPSG:4326.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self(Value::invoke(
            "GeometryConstructors.Rectangle",
            [
                ("coordinates", Value::Constant(json!([min_x, min_y, max_x, max_y]))),
                ("geodesic", Value::from(false)),
            ],
        ))
    }
}

impl From<&registry_common::BoundingBox> for Geometry {
    fn from(bbox: &registry_common::BoundingBox) -> Self {
        Geometry::rectangle(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)
    }
}
