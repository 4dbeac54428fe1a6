//! JSON documents in the object store.
//!
//! The store endpoint (plain S3 or an S3-compatible service such as
//! lakeFS) is whatever the ambient AWS configuration points at.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serializes a value to JSON and uploads it with `application/json`
/// content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
) -> Result<()> {
    let body = serde_json::to_vec(value)?;

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(body.into())
        .content_type("application/json")
        .send()
        .await?;

    Ok(())
}

/// Downloads an object and parses it as JSON.
pub async fn read_json_from_s3<T: DeserializeOwned>(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<T> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .with_context(|| format!("GetObject failed for s3://{bucket}/{key}"))?;

    let body = resp.body.collect().await?.into_bytes();
    serde_json::from_slice(&body)
        .with_context(|| format!("malformed JSON document at s3://{bucket}/{key}"))
}
