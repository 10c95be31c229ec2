//! Composite operations shared by the dataset fetchers.

use crate::image::{Filter, Geometry, Image, ImageCollection};

/// No-data value for int16 exports.
pub const INT16_NODATA: f64 = -32768.0;

/// Load a collection and optionally narrow it by date, bounds and bands.
///
/// `date_end` is only used together with `date_start`; without it the range
/// is open-ended.
pub fn get_ic<S: AsRef<str>>(
    product: &str,
    date_start: Option<&str>,
    date_end: Option<&str>,
    bands: Option<&[S]>,
    bounds: Option<Geometry>,
) -> ImageCollection {
    let mut ic = ImageCollection::load(product);

    if let Some(start) = date_start {
        ic = ic.filter_date(start, date_end.unwrap_or("9999-12-31"));
    }

    if let Some(bounds) = bounds {
        ic = ic.filter_bounds(bounds);
    }

    if let Some(bands) = bands {
        ic = ic.select(bands);
    }

    ic
}

/// Extract bits `from_bit..=to_bit` of a QA band as an integer image.
pub fn bitwise_extract(image: &Image, from_bit: u32, to_bit: Option<u32>) -> Image {
    let to_bit = to_bit.unwrap_or(from_bit);
    let mask_size = to_bit + 1 - from_bit;
    let mask = (1u32 << mask_size) - 1;
    image.right_shift(from_bit).bitwise_and(mask)
}

/// Mask cloudy and cloud-shadowed pixels of MODIS surface reflectance.
///
/// A pixel is kept when the cloud state (bits 0-1) is clear (0) or assumed
/// clear (3) and the internal cloud flag (bit 10) is unset.
pub fn mask_clouds(ic: &ImageCollection, qa_band: &str) -> ImageCollection {
    let qa_band = qa_band.to_string();
    ic.map(move |image| {
        let qa = image.select(&[qa_band.as_str()]);
        let cloud_state = bitwise_extract(&qa, 0, Some(1));
        let clear = cloud_state.eq(0u32).or(&cloud_state.eq(3u32));
        let no_internal_cloud = bitwise_extract(&qa, 10, None).eq(0u32);
        image.update_mask(&no_internal_cloud.and(&clear))
    })
}

/// Name of a monthly mean band.
pub fn monthly_band_name(band: &str, year_start: &str, year_end: &str, month: u32) -> String {
    format!("{}_{}-{}_m{}_mean", band, year_start, year_end, month)
}

/// One single-band image per (month, band): the mean of that band over
/// every image in `month` across all years of the collection.
///
/// Band names come from the caller since the collection is never
/// evaluated here.
pub fn calculate_monthly_averages<S: AsRef<str>>(
    ic: &ImageCollection,
    bands: &[S],
    year_start: &str,
    year_end: &str,
) -> ImageCollection {
    let mut images = Vec::with_capacity(12 * bands.len());
    for month in 1..=12 {
        let monthly = ic.filter(Filter::calendar_range(month, month, "month"));
        for band in bands {
            let band = band.as_ref();
            let name = monthly_band_name(band, year_start, year_end, month);
            images.push(monthly.select(&[band]).mean().rename(&[name]));
        }
    }
    ImageCollection::from_images(images)
}

/// Add an `ndvi` band computed from NIR (`sur_refl_b02`) and red
/// (`sur_refl_b01`).
pub fn add_ndvi(ic: &ImageCollection) -> ImageCollection {
    ic.map(|image| {
        let ndvi = image
            .normalized_difference("sur_refl_b02", "sur_refl_b01")
            .rename(&["ndvi"]);
        image.add_bands(&ndvi)
    })
}

/// Fill masked pixels with -32768 and cast to int16.
pub fn mask_and_cast_int16(ic: &ImageCollection) -> ImageCollection {
    ic.map(|image| image.unmask(INT16_NODATA)).map(|image| image.to_int16())
}

/// Year component of a `YYYY-MM-DD` date.
pub fn year_of(date: &str) -> &str {
    date.split('-').next().unwrap_or(date)
}
