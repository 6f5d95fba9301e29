//! Geospatial scalar functions
//!
//! Planar helpers (distance, bearing, is_inside_circle), great-circle
//! distance and geohash encoding/neighbour lookup.

use std::f64::consts::PI;

use crate::error::{Error, ErrorCode, Result};
use crate::types::Value;

use super::context::FunctionContext;

/// Read `n` non-NULL numeric parameters or fail with the planar helpers' messages
fn planar_args(name: &str, args: &[Value], n: usize) -> Result<Vec<f64>> {
    if args.len() < n {
        return Err(Error::with_message(
            ErrorCode::Error,
            format!("{} requires {} parameters", name, n),
        ));
    }
    if args[..n].iter().any(Value::is_null) {
        return Err(Error::with_message(
            ErrorCode::Error,
            format!("{} requires {} non-null numeric parameters", name, n),
        ));
    }
    Ok(args[..n].iter().map(Value::to_f64).collect())
}

// ============================================================================
// Planar Geometry
// ============================================================================

/// distance(X1, Y1, X2, Y2) - Euclidean distance
pub fn func_distance(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let p = planar_args("distance", args, 4)?;
    Ok(Value::Real((p[0] - p[2]).hypot(p[1] - p[3])))
}

/// bearing(X1, Y1, X2, Y2) - compass bearing from the first point to the second
///
/// Degrees in [0, 360), clockwise from +Y. NULL for identical points.
pub fn func_bearing(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let p = planar_args("bearing", args, 4)?;
    let (x1, y1, x2, y2) = (p[0], p[1], p[2], p[3]);
    if x1 == x2 && y1 == y2 {
        return Ok(Value::Null);
    }
    let bearing = ((x2 - x1).atan2(y2 - y1) * (180.0 / PI)) % 360.0;
    Ok(Value::Real(if bearing < 0.0 {
        bearing + 360.0
    } else {
        bearing
    }))
}

/// is_inside_circle(CX, CY, R, X, Y) - 1 if (X, Y) lies within the circle
pub fn func_is_inside_circle(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let p = planar_args("is_inside_circle", args, 5)?;
    let r = p[2];
    let xd = (p[0] - p[3]).abs();
    let yd = (p[1] - p[4]).abs();

    let inside = if xd + yd <= r {
        true
    } else if xd > r || yd > r {
        false
    } else {
        xd * xd + yd * yd <= r * r
    };
    Ok(Value::Integer(inside as i64))
}

// ============================================================================
// Great-circle Distance
// ============================================================================

/// Distance unit selected by the first letter of the unit argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
    NauticalMiles,
}

impl DistanceUnit {
    pub fn from_name(name: &str) -> Self {
        match name.bytes().next() {
            Some(b'K') => DistanceUnit::Kilometers,
            Some(b'N') => DistanceUnit::NauticalMiles,
            _ => DistanceUnit::Miles,
        }
    }
}

/// Spherical law of cosines between two lat/lon points in degrees
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, unit: DistanceUnit) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let theta = (lon1 - lon2).to_radians();
    let cos_d = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * theta.cos();
    let miles = cos_d.clamp(-1.0, 1.0).acos().to_degrees() * 60.0 * 1.1515;
    match unit {
        DistanceUnit::Miles => miles,
        DistanceUnit::Kilometers => miles * 1.609344,
        DistanceUnit::NauticalMiles => miles * 0.8684,
    }
}

/// geodistance(LAT1, LON1, LAT2, LON2, UNIT)
pub fn func_geodistance(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    if args.len() < 4 || args[..4].iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let unit = args
        .get(4)
        .map_or(DistanceUnit::Miles, |u| DistanceUnit::from_name(&u.to_text()));
    Ok(Value::Real(great_circle_distance(
        args[0].to_f64(),
        args[1].to_f64(),
        args[2].to_f64(),
        args[3].to_f64(),
        unit,
    )))
}

// ============================================================================
// Geohash
// ============================================================================

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";
const BITS: [u8; 5] = [16, 8, 4, 2, 1];

/// Neighbour and border tables indexed by right, left, top, bottom for
/// even-length hashes; odd lengths swap the axes.
const NEIGHBORS: [&[u8; 32]; 4] = [
    b"bc01fg45238967deuvhjyznpkmstqrwx",
    b"238967debc01fg45kmstqrwxuvhjyznp",
    b"p0r21436x8zb9dcf5h7kjnmqesgutwvy",
    b"14365h7k9dcfesgujnmqp0r2twvyx8zb",
];
const BORDERS: [&[u8]; 4] = [b"bcfguvyz", b"0145hjnp", b"prxz", b"028b"];

/// Neighbour direction for [`geohash_neighbor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoDir {
    Right = 0,
    Left = 1,
    Top = 2,
    Bottom = 3,
}

impl GeoDir {
    pub fn from_i64(dir: i64) -> Option<Self> {
        match dir {
            0 => Some(GeoDir::Right),
            1 => Some(GeoDir::Left),
            2 => Some(GeoDir::Top),
            3 => Some(GeoDir::Bottom),
            _ => None,
        }
    }
}

fn base32_index(c: u8) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    BASE32.iter().position(|&b| b == c)
}

/// Encode a point as a geohash of `precision` characters
pub fn encode_geohash(latitude: f64, longitude: f64, precision: usize) -> String {
    let mut lat = [-90.0, 90.0];
    let mut lon = [-180.0, 180.0];
    let mut out = String::with_capacity(precision);
    let mut even = true;
    let (mut bit, mut ch) = (0, 0u8);

    while out.len() < precision {
        let (range, coord) = if even {
            (&mut lon, longitude)
        } else {
            (&mut lat, latitude)
        };
        let mid = (range[0] + range[1]) / 2.0;
        if coord > mid {
            ch |= BITS[bit];
            range[0] = mid;
        } else {
            range[1] = mid;
        }
        even = !even;

        if bit < 4 {
            bit += 1;
        } else {
            out.push(BASE32[ch as usize] as char);
            bit = 0;
            ch = 0;
        }
    }
    out
}

/// Bounding box of a geohash as ([lat_min, lat_max], [lon_min, lon_max])
///
/// Returns `None` if the hash holds a character outside the geohash alphabet.
pub fn decode_geohash_bbox(geohash: &str) -> Option<([f64; 2], [f64; 2])> {
    let mut lat = [-90.0, 90.0];
    let mut lon = [-180.0, 180.0];
    let mut even = true;

    for c in geohash.bytes() {
        let cd = base32_index(c)? as u8;
        for mask in BITS {
            let range = if even { &mut lon } else { &mut lat };
            let mid = (range[0] + range[1]) / 2.0;
            if cd & mask != 0 {
                range[0] = mid;
            } else {
                range[1] = mid;
            }
            even = !even;
        }
    }
    Some((lat, lon))
}

/// Centre of a geohash cell as (lat, lon)
pub fn decode_geohash(geohash: &str) -> Option<(f64, f64)> {
    let (lat, lon) = decode_geohash_bbox(geohash)?;
    Some(((lat[0] + lat[1]) / 2.0, (lon[0] + lon[1]) / 2.0))
}

/// Replace the first `len` characters of `hash` with the adjacent cell
///
/// A character on the cell border carries into its parent prefix. At the
/// top level the grid wraps around.
fn shift_prefix(hash: &mut [u8], dir: GeoDir, len: usize) -> Option<()> {
    let index = (2 * (len % 2) + dir as usize) % 4;
    let last = hash[len - 1].to_ascii_lowercase();
    base32_index(last)?;
    if len > 1 && BORDERS[index].contains(&last) {
        shift_prefix(hash, dir, len - 1)?;
    }
    let pos = NEIGHBORS[index].iter().position(|&b| b == last)?;
    hash[len - 1] = BASE32[pos];
    Some(())
}

/// Neighbour of the cell named by the first `len` characters of `geohash`
///
/// Characters past `len` are returned unchanged.
pub fn geohash_neighbor(geohash: &str, len: i64, dir: GeoDir) -> Option<String> {
    let mut bytes = geohash.as_bytes().to_vec();
    let len = usize::try_from(len).ok()?.min(bytes.len());
    if len == 0 {
        return None;
    }
    shift_prefix(&mut bytes, dir, len)?;
    String::from_utf8(bytes).ok()
}

/// geohash(LAT, LON, PRECISION)
pub fn func_geohash(ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let get = |i: usize| args.get(i).unwrap_or(&Value::Null);
    let precision = get(2).to_i64().max(0) as usize;
    ctx.check_length(precision)?;
    Ok(Value::Text(encode_geohash(
        get(0).to_f64(),
        get(1).to_f64(),
        precision,
    )))
}

/// geohashneighbor(HASH, LEN, DIR)
pub fn func_geohashneighbor(_ctx: &mut FunctionContext, args: &[Value]) -> Result<Value> {
    let get = |i: usize| args.get(i).unwrap_or(&Value::Null);
    if get(0).is_null() {
        return Ok(Value::Null);
    }
    let Some(dir) = GeoDir::from_i64(get(2).to_i64()) else {
        return Ok(Value::Null);
    };
    Ok(geohash_neighbor(&get(0).to_text(), get(1).to_i64(), dir).into())
}
