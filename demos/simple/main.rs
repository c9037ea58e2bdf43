pub fn main() -> remote_flags::Result<()> {
    // Configure env_logger to see provider logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("remote_flags")).init();

    let endpoint = std::env::var("FLAGS_ENDPOINT")
        .expect("FLAGS_ENDPOINT env variable should contain the evaluation service URL");
    let mut config = remote_flags::ProviderConfig::from_endpoint(endpoint);
    if let Ok(api_key) = std::env::var("FLAGS_API_KEY") {
        config = config.api_key(api_key);
    }
    let provider = config.to_provider()?;

    let context = remote_flags::EvaluationContext::new("test-subject")
        .with_attribute("email", "john.doe@example.org")
        .with_attribute("admin", true);

    let result = provider.resolve_boolean("a-boolean-flag", false, &context);
    if let Some(err) = result.error() {
        println!("resolution failed, using default value: {}", err);
    }

    println!("Value: {:?} (variant: {:?}, reason: {})", result.value, result.variant, result.reason);

    Ok(())
}
