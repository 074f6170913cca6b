use serde_json::Value;

use crate::error::ShuffleError;
use crate::shuffle::ShuffleType;

/// A shuffle request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleRequest {
    pub random_nums: u64,
    pub service_type: ShuffleType,
}

/// Request validation utilities
#[derive(Debug, Clone)]
pub struct RequestValidator {
    max_playlist_size: u64,
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_PLAYLIST_SIZE)
    }
}

impl RequestValidator {
    pub fn new(max_playlist_size: u64) -> Self {
        Self { max_playlist_size }
    }

    /// Decodes a raw request body. An empty body is treated as an absent payload.
    pub fn parse_body(body: &[u8]) -> Result<Option<Value>, ShuffleError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(body)
            .map(Some)
            .map_err(|_| ShuffleError::MalformedJson)
    }

    /// Checks the playlist size field of a shuffle payload.
    pub fn validate_playlist_size(&self, payload: Option<&Value>) -> Result<u64, ShuffleError> {
        let random_nums = payload
            .and_then(Value::as_object)
            .and_then(|body| body.get("random_nums"))
            .ok_or(ShuffleError::MissingField)?;

        let playlist_size = random_nums
            .as_u64()
            .filter(|n| *n > 0)
            .ok_or(ShuffleError::InvalidType)?;

        if playlist_size > self.max_playlist_size {
            return Err(ShuffleError::PlaylistTooLarge {
                max: self.max_playlist_size,
            });
        }

        Ok(playlist_size)
    }

    /// Resolves `service_type`, defaulting to basic when the key is absent.
    pub fn validate_service_type(payload: &Value) -> Result<ShuffleType, ShuffleError> {
        match payload.get("service_type") {
            None => Ok(ShuffleType::default()),
            Some(Value::String(name)) => name.parse(),
            Some(_) => Err(ShuffleError::InvalidShuffleType),
        }
    }

    /// Validates a full shuffle payload.
    pub fn validate_shuffle_request(
        &self,
        payload: Option<&Value>,
    ) -> Result<ShuffleRequest, ShuffleError> {
        let random_nums = self.validate_playlist_size(payload)?;
        // validate_playlist_size guarantees an object is present
        let service_type = payload
            .map(Self::validate_service_type)
            .transpose()?
            .unwrap_or_default();

        Ok(ShuffleRequest {
            random_nums,
            service_type,
        })
    }
}
