use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load AWS configuration for the given region from the default provider chain.
pub async fn load_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Build a Bedrock runtime client for the given region.
pub async fn build_client(region: &str) -> aws_sdk_bedrockruntime::Client {
    let config = load_config(region).await;
    aws_sdk_bedrockruntime::Client::new(&config)
}
