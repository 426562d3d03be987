//! Saved IBM Quantum account management.

use anyhow::{Context, Result, bail};
use console::style;

use grover_adapter_ibm::{API_KEY_VAR, CredentialSource, Credentials, TOKEN_VAR};
use grover_hal::{AccountStore, Channel, SavedAccount};

fn store() -> Result<AccountStore> {
    AccountStore::default_location().context("Cannot locate the account file")
}

/// Build the account `auth save` writes.
pub fn build_account(
    token: &str,
    channel: Channel,
    instance: Option<&str>,
    url: Option<&str>,
) -> Result<SavedAccount> {
    if token.trim().is_empty() {
        bail!("--token must not be empty");
    }
    if channel == Channel::IbmCloud && instance.is_none() {
        bail!("ibm_cloud accounts need --instance <service CRN>");
    }
    let mut account = SavedAccount::new(channel, token.trim());
    if let Some(instance) = instance {
        account = account.with_instance(instance);
    }
    if let Some(url) = url {
        account = account.with_url(url);
    }
    Ok(account)
}

/// Execute the auth save subcommand.
pub fn execute_save(
    store: Option<&AccountStore>,
    account: &SavedAccount,
    overwrite: bool,
) -> Result<()> {
    let default_store;
    let store = match store {
        Some(store) => store,
        None => {
            default_store = self::store()?;
            &default_store
        }
    };
    store.save(account, overwrite)?;
    println!(
        "{} Saved {} account to {}",
        style("✓").green().bold(),
        style(account.channel).yellow(),
        store.path().display()
    );
    Ok(())
}

/// Execute the auth status subcommand.
pub fn execute_status() -> Result<()> {
    let store = store()?;
    println!("{} Authentication status:\n", style("→").cyan().bold());

    match store.load()? {
        Some(account) => {
            println!(
                "  {}: {} ({})",
                style("Saved account").bold(),
                style(account.channel).green(),
                account.masked_token()
            );
            if let Some(instance) = &account.instance {
                println!("    Instance: {instance}");
            }
            if let Some(url) = &account.url {
                println!("    Endpoint: {url}");
            }
        }
        None => println!("  {}: {}", style("Saved account").bold(), style("none").red()),
    }

    match Credentials::resolve(Some(&store)) {
        Ok(credentials) => {
            let source = match credentials.source() {
                CredentialSource::Environment => "environment",
                CredentialSource::SavedAccount => "saved account",
            };
            println!(
                "  {}: {} via {}",
                style("Active").bold(),
                style(credentials.channel()).green(),
                source
            );
        }
        Err(e) => {
            println!("  {}: {}", style("Active").bold(), style(e).red());
            println!(
                "  Set {} or {} (with IBM_SERVICE_CRN), or run {}",
                TOKEN_VAR,
                API_KEY_VAR,
                style("grover auth save --token <token>").dim()
            );
        }
    }
    Ok(())
}

/// Execute the auth delete subcommand.
pub fn execute_delete() -> Result<()> {
    let store = store()?;
    if store.delete()? {
        println!(
            "{} Deleted {}",
            style("✓").green().bold(),
            store.path().display()
        );
    } else {
        println!("  No saved account at {}", store.path().display());
    }
    Ok(())
}
