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
use crate::model::InvalidValueError;

#[derive(thiserror::Error, Debug)]
pub enum IrmcError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Could not deserialize {what}. Body: {body}. {source}")]
    JsonDeserializeError {
        what: String,
        body: String,
        source: serde_json::Error,
    },

    #[error("Missing key {key} in JSON at {location}")]
    MissingKey { key: String, location: String },

    #[error("Key {key} should be {expected_type} at {location}")]
    InvalidKeyType {
        key: String,
        expected_type: String,
        location: String,
    },

    #[error("Field {field} is invalid: {err}")]
    InvalidValue {
        field: String,
        err: InvalidValueError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IrmcError {
    pub(crate) fn invalid_value(field: &str, msg: impl Into<String>) -> Self {
        IrmcError::InvalidValue {
            field: field.to_string(),
            err: InvalidValueError(msg.into()),
        }
    }
}
