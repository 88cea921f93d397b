use anyhow::Result;
use calmirror_core::provider::Provider;

pub async fn run(provider_name: &str) -> Result<()> {
    let provider = Provider::from_name(provider_name);

    println!("Authenticating with {}...", provider_name);

    // Provider handles the full OAuth flow and stores credentials/tokens
    let account = provider.authenticate().await?;

    println!("\nAuthenticated as: {}", account);
    println!("\nNow point the destination at it in config.toml:");
    println!();
    println!("[destination]");
    println!("provider = \"{}\"", provider_name);
    println!("{}_account = \"{}\"", provider_name, account);
    println!("{}_calendar_id = \"primary\"", provider_name);
    println!();
    println!("Then run `calmirror status` to preview the first sync.");

    Ok(())
}
