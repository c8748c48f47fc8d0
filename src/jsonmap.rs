/*
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */

// jsonmap.rs
// Typed access to values inside JSON maps, for documents (BIOS attribute
// maps, combined desired/observed files) that have no fixed schema.

use std::any::type_name;
use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::{ApproximateQuantity, IrmcError};

// JsonMap abstracts over serde_json::Map and HashMap so the helpers below
// work with both.
pub trait JsonMap {
    fn get_value(&self, key: &str) -> Option<&serde_json::Value>;

    fn remove_value(&mut self, key: &str) -> Option<serde_json::Value>;
}

impl JsonMap for serde_json::Map<String, serde_json::Value> {
    fn get_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key)
    }

    fn remove_value(&mut self, key: &str) -> Option<serde_json::Value> {
        self.remove(key)
    }
}

impl JsonMap for HashMap<String, serde_json::Value> {
    fn get_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key)
    }

    fn remove_value(&mut self, key: &str) -> Option<serde_json::Value> {
        self.remove(key)
    }
}

fn missing_key_error(key: &str, location: &str) -> IrmcError {
    IrmcError::MissingKey {
        key: key.to_string(),
        location: location.to_string(),
    }
}

fn invalid_type_error(key: &str, expected_type: &str, location: &str) -> IrmcError {
    IrmcError::InvalidKeyType {
        key: key.to_string(),
        expected_type: expected_type.to_string(),
        location: location.to_string(),
    }
}

// get_value returns the raw value for key. A JSON null counts as missing.
pub fn get_value<'a, M: JsonMap>(
    map: &'a M,
    key: &str,
    location: &str,
) -> Result<&'a serde_json::Value, IrmcError> {
    match map.get_value(key) {
        None | Some(serde_json::Value::Null) => Err(missing_key_error(key, location)),
        Some(v) => Ok(v),
    }
}

pub fn get_str<'a, M: JsonMap>(
    map: &'a M,
    key: &str,
    location: &str,
) -> Result<&'a str, IrmcError> {
    get_value(map, key, location)?
        .as_str()
        .ok_or_else(|| invalid_type_error(key, "string", location))
}

pub fn get_i64<M: JsonMap>(map: &M, key: &str, location: &str) -> Result<i64, IrmcError> {
    get_value(map, key, location)?
        .as_i64()
        .ok_or_else(|| invalid_type_error(key, "integer", location))
}

// get_quantity reads an integer byte count, e.g. CapacityBytes.
pub fn get_quantity<M: JsonMap>(
    map: &M,
    key: &str,
    location: &str,
) -> Result<ApproximateQuantity, IrmcError> {
    get_i64(map, key, location).map(ApproximateQuantity::from_raw)
}

// get_scalar_string renders a string, number or boolean the way it is
// written in configuration. BIOS attribute values come in all three.
pub fn get_scalar_string<M: JsonMap>(
    map: &M,
    key: &str,
    location: &str,
) -> Result<String, IrmcError> {
    match get_value(map, key, location)? {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid_type_error(key, "string, number or boolean", location)),
    }
}

// extract removes key from the map and deserializes it to T.
pub fn extract<T, M: JsonMap>(map: &mut M, key: &str, location: &str) -> Result<T, IrmcError>
where
    T: DeserializeOwned,
{
    let json = map
        .remove_value(key)
        .ok_or_else(|| missing_key_error(key, location))?;
    serde_json::from_value::<T>(json)
        .map_err(|_| invalid_type_error(key, type_name::<T>(), location))
}
