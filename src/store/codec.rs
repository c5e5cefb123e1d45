//! Embedding BLOB conversion.
//!
//! Embeddings are stored as little-endian `f32` values, 4 bytes per dimension.

use super::StoreError;

/// Bytes per stored embedding component.
pub const BYTES_PER_DIM: usize = std::mem::size_of::<f32>();

/// Convert an embedding to a BLOB (little-endian bytes).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|&x| x.to_le_bytes()).collect()
}

/// Convert a BLOB back into an embedding of exactly `dims` components.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` (without a record id) if the BLOB does not hold
/// exactly `dims` values or any value is NaN or infinite.
pub fn blob_to_vec(blob: &[u8], dims: usize) -> Result<Vec<f32>, StoreError> {
    let expected_len = dims.checked_mul(BYTES_PER_DIM).ok_or_else(|| StoreError::Corrupt {
        id: None,
        reason: format!("recorded dimensionality {dims} is out of range"),
    })?;
    if blob.len() != expected_len {
        let reason = if blob.len() % BYTES_PER_DIM == 0 {
            format!(
                "embedding has {} dimensions, store has {dims}",
                blob.len() / BYTES_PER_DIM
            )
        } else {
            format!(
                "embedding BLOB is {} bytes, not a whole number of f32 values",
                blob.len()
            )
        };
        return Err(StoreError::Corrupt { id: None, reason });
    }

    let vec: Vec<f32> = blob
        .chunks_exact(BYTES_PER_DIM)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if vec.iter().any(|x| !x.is_finite()) {
        return Err(StoreError::Corrupt {
            id: None,
            reason: "embedding contains NaN or infinite values".to_string(),
        });
    }
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_size() {
        let blob = vec_to_blob(&[0.5f32; 384]);
        assert_eq!(blob.len(), 1536);
    }

    #[test]
    fn test_blob_round_trip_is_exact() {
        let original = vec![0.123f32, -7.5, 1e-30, 0.0];
        let decoded = blob_to_vec(&vec_to_blob(&original), 4).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_blob_wrong_dimensions() {
        let blob = vec_to_blob(&[1.0f32; 3]);
        let err = blob_to_vec(&blob, 4).unwrap_err();
        match err {
            StoreError::Corrupt { id, reason } => {
                assert_eq!(id, None);
                assert!(reason.contains("3 dimensions"));
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_blob_truncated() {
        let err = blob_to_vec(&[0u8; 10], 4).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_blob_huge_dims_rejected() {
        let blob = vec_to_blob(&[1.0, 2.0]);
        assert!(matches!(
            blob_to_vec(&blob, usize::MAX / 2),
            Err(StoreError::Corrupt { id: None, .. })
        ));
    }

    #[test]
    fn test_blob_nan_rejected() {
        let blob = vec_to_blob(&[1.0, f32::NAN]);
        assert!(matches!(
            blob_to_vec(&blob, 2),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
