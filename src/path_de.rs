//! serde decoding that reports where in the document a value went wrong.
use serde::de::DeserializeOwned;

use crate::error::{RenderError, Result};

/// Decode a whole JSON document. Failures name the JSON path of the offending
/// value (e.g. `api.tabs.functions.get.minItems`); trailing content after the
/// document is rejected.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    let value = serde_path_to_error::deserialize::<_, T>(&mut *de).map_err(|err| {
        let path = err.path().to_string();
        RenderError::Input(format!("at JSON path {path} → {}", err.into_inner()))
    })?;
    de.end().map_err(|err| RenderError::Input(format!("after document → {err}")))?;
    Ok(value)
}
