//! Check that the API key is accepted.

use storyboard_common::config::AppConfig;
use storyboard_genai::check_credentials;

use crate::session::Session;

pub async fn run(config: AppConfig, api_key: Option<String>) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let client = session.client()?;
    let credentials = session.credentials(api_key)?;

    println!("Storyboard Key Check");
    println!("{}", "=".repeat(50));
    println!("Endpoint: {}", client.config().base_url);
    println!("Model: {}", client.config().ping_model);

    let ok = check_credentials(&client, &credentials, &mut session.log).await;
    session.print_log();

    println!();
    if ok {
        println!("The key is valid. Analysis and sketching are available.");
        Ok(())
    } else {
        Err(anyhow::anyhow!("The key was not accepted"))
    }
}
