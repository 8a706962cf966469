//! Native GeoTIFF scene reading (without GDAL dependency)
//!
//! Uses the `tiff` crate for TIFF decoding plus the GeoTIFF
//! ModelPixelScale/ModelTiepoint tags for georeferencing. Bands may be
//! stored interleaved (SamplesPerPixel > 1) or as one image directory per
//! band; both layouts are handled.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::Scene;
use crate::raster::{GeoTransform, Raster};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

// GeoTIFF tag ids (not named in the `tiff` crate)
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;

// GeoKey ids carrying an EPSG code
const GEOGRAPHIC_TYPE_GEO_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u32 = 3072;

/// Options controlling how a scene is read
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// 1-based index of the green band (PlanetScope analytic: 2)
    pub green_band: usize,
    /// 1-based index of the near-infrared band (PlanetScope analytic: 4)
    pub nir_band: usize,
    /// Value marking fill/nodata pixels in both bands
    pub nodata: Option<f64>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            green_band: 2,
            nir_band: 4,
            nodata: Some(0.0),
        }
    }
}

/// Read a single band (1-based) of a GeoTIFF into a `Raster<f64>`
pub fn read_band<P: AsRef<Path>>(path: P, band: usize) -> Result<Raster<f64>> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(file)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let meta = read_georeferencing(&mut decoder);
    let mut cursor = 1;
    let (data, rows, cols) = decode_band(&mut decoder, band, &mut cursor)?;

    build_raster(data, rows, cols, &meta, None)
}

/// Read a two-band scene (green + NIR) from a GeoTIFF
pub fn read_scene<P: AsRef<Path>>(path: P, options: &SceneOptions) -> Result<Scene> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(file)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let meta = read_georeferencing(&mut decoder);

    let (first, second) = if options.green_band <= options.nir_band {
        (options.green_band, options.nir_band)
    } else {
        (options.nir_band, options.green_band)
    };

    // Bands must be decoded in file order; swap back afterwards.
    let mut cursor = 1;
    let (data_a, rows, cols) = decode_band(&mut decoder, first, &mut cursor)?;
    let (data_b, rows_b, cols_b) = decode_band(&mut decoder, second, &mut cursor)?;

    if (rows, cols) != (rows_b, cols_b) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: rows_b,
            ac: cols_b,
        });
    }

    let (green_data, nir_data) = if options.green_band <= options.nir_band {
        (data_a, data_b)
    } else {
        (data_b, data_a)
    };

    let green = build_raster(green_data, rows, cols, &meta, options.nodata)?;
    let nir = build_raster(nir_data, rows, cols, &meta, options.nodata)?;

    Scene::from_bands(green, nir)
}

/// Georeferencing recovered from TIFF tags
struct GeoMeta {
    transform: Option<GeoTransform>,
    crs: Option<CRS>,
}

fn build_raster(
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    meta: &GeoMeta,
    nodata: Option<f64>,
) -> Result<Raster<f64>> {
    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = meta.transform {
        raster.set_transform(transform);
    }
    raster.set_crs(meta.crs.clone());
    raster.set_nodata(nodata);
    Ok(raster)
}

/// Decode one band (1-based).
///
/// Interleaved files carry all bands in one IFD; planar files carry one IFD
/// per band, which the decoder walks forward through. `cursor` tracks the
/// 1-based directory the decoder currently sits on, since directories can
/// only be visited front to back.
fn decode_band<R>(
    decoder: &mut Decoder<R>,
    band: usize,
    cursor: &mut usize,
) -> Result<(Vec<f64>, usize, usize)>
where
    R: std::io::Read + std::io::Seek,
{
    if band == 0 {
        return Err(Error::InvalidParameter {
            name: "band",
            value: "0".to_string(),
            reason: "band indices are 1-based".to_string(),
        });
    }

    let samples = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    if samples > 1 {
        if band > samples {
            return Err(Error::BandOutOfRange {
                band,
                available: samples,
            });
        }
        let interleaved = read_image_f64(decoder)?;
        if interleaved.len() != rows * cols * samples {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        let data = interleaved
            .chunks_exact(samples)
            .map(|px| px[band - 1])
            .collect();
        return Ok((data, rows, cols));
    }

    // One IFD per band: advance to the requested directory
    if band < *cursor {
        return Err(Error::BandOutOfRange {
            band,
            available: *cursor,
        });
    }
    while *cursor < band {
        if !decoder.more_images() {
            return Err(Error::BandOutOfRange {
                band,
                available: *cursor,
            });
        }
        decoder
            .next_image()
            .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;
        *cursor += 1;
    }

    // Dimensions of the directory actually decoded
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let data = read_image_f64(decoder)?;
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }
    Ok((data, rows, cols))
}

fn read_image_f64<R>(decoder: &mut Decoder<R>) -> Result<Vec<f64>>
where
    R: std::io::Read + std::io::Seek,
{
    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data = match result {
        DecodingResult::U8(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::U16(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::U32(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::U64(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::I8(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::I16(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::I32(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::I64(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::F32(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    Ok(data)
}

/// Recover geotransform and CRS from the first image directory.
///
/// Both are optional in the wild; absence is not an error here, the caller
/// decides whether ungeoreferenced data is acceptable.
fn read_georeferencing<R>(decoder: &mut Decoder<R>) -> GeoMeta
where
    R: std::io::Read + std::io::Seek,
{
    GeoMeta {
        transform: read_geotransform(decoder).ok(),
        crs: read_crs(decoder),
    }
}

/// Geotransform from ModelPixelScaleTag + ModelTiepointTag
fn read_geotransform<R>(decoder: &mut Decoder<R>) -> Result<GeoTransform>
where
    R: std::io::Read + std::io::Seek,
{
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE))
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT))
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        let pixel_width = scale[0];
        let pixel_height = -scale[1]; // Negative for north-up

        return Ok(GeoTransform::new(
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        ));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// EPSG code from the GeoKeyDirectoryTag, if present
fn read_crs<R>(decoder: &mut Decoder<R>) -> Option<CRS>
where
    R: std::io::Read + std::io::Seek,
{
    let keys = decoder
        .get_tag_u32_vec(Tag::Unknown(GEO_KEY_DIRECTORY))
        .ok()?;

    // Header is [version, revision, minor, key_count], then 4-value entries
    // of (key_id, tag_location, count, value).
    if keys.len() < 4 {
        return None;
    }
    let count = keys[3] as usize;

    for i in 0..count {
        let base = 4 + i * 4;
        if base + 3 >= keys.len() {
            break;
        }
        let (key_id, location, value) = (keys[base], keys[base + 1], keys[base + 3]);
        if location == 0
            && (key_id == PROJECTED_CS_TYPE_GEO_KEY || key_id == GEOGRAPHIC_TYPE_GEO_KEY)
            && value > 0
            && value < 65535
        {
            return Some(CRS::from_epsg(value));
        }
    }

    None
}
