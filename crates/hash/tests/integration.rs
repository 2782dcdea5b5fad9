//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use gantry_hash::*;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_verify_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");

        let data = b"verify this content";
        fs::write(&file_path, data).await.unwrap();

        let hash = Hash::from_data(data);
        assert!(verify_file(&file_path, &hash).await.is_ok());

        let wrong_hash = Hash::from_data(b"different content");
        assert!(verify_file(&file_path, &wrong_hash).await.is_err());
    }

    #[test]
    fn test_hash_from_hex_errors() {
        // Too short
        let result = Hash::from_hex("1234");
        assert!(result.is_err());

        // Too long
        let result = Hash::from_hex(&"a".repeat(65));
        assert!(result.is_err());

        // Invalid hex
        let result = Hash::from_hex("xyz123");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_manifest_covers_distribution_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("demo-0.1.0.crate"), b"artifact bytes")
            .await
            .unwrap();

        let manifest =
            ChecksumManifest::for_files(dir.path(), &["demo-0.1.0.crate".to_string()])
                .await
                .unwrap();
        let manifest_path = dir.path().join("CHECKSUMS.blake3");
        manifest.write(&manifest_path).await.unwrap();

        let loaded = ChecksumManifest::load(&manifest_path).await.unwrap();
        loaded.verify(dir.path()).await.unwrap();
    }
}
