//! Oracle membership commands: authorize, deauthorize, oracles.

use verireg_canonical::Identity;
use verireg_core::RegistryConfig;

use super::{open_registry, CommandResult};
use crate::output;

pub fn authorize(journal: String, caller: Identity, oracle: Identity, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    let already = registry.is_oracle(&oracle);
    registry.authorize_oracle(&caller, &oracle)?;
    if already {
        println!("{} is already an oracle", oracle);
    } else {
        println!("Authorized {}", oracle);
    }
    Ok(())
}

pub fn deauthorize(journal: String, caller: Identity, oracle: Identity, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    let was = registry.is_oracle(&oracle);
    registry.deauthorize_oracle(&caller, &oracle)?;
    if was {
        println!("Deauthorized {}", oracle);
    } else {
        println!("{} is not an oracle", oracle);
    }
    Ok(())
}

pub fn list(journal: String, json: bool, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    let owner = registry.owner();
    let oracles = registry.oracles();

    if json {
        output::print_json(&serde_json::json!({
            "owner": owner,
            "oracles": oracles,
        }))?;
        return Ok(());
    }
    println!("owner: {}", owner);
    for oracle in oracles {
        println!("{}", oracle);
    }
    Ok(())
}
