//! Error types for the data model

/// Errors raised while reading a source record
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Record is not shaped like the expected entity
    #[error("malformed {entity}: {source}")]
    Malformed {
        /// Entity kind being parsed
        entity: &'static str,
        /// Underlying decode failure
        #[source]
        source: serde_json::Error,
    },
}

impl ModelError {
    /// Create malformed record error
    #[inline]
    pub fn malformed(entity: &'static str, source: serde_json::Error) -> Self {
        Self::Malformed { entity, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_names_entity() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = ModelError::malformed("config context", source);
        assert!(err.to_string().starts_with("malformed config context"));
    }
}
