//! Assertion helpers for compose generation behavioural tests.

use openclaw_setup::output::ENV_FILE_KEYS;
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{GeneratedContents, GenerationOutcome, GenerationState};

fn generated(generation_state: &GenerationState) -> StepResult<GeneratedContents> {
    match generation_state.outcome.get() {
        Some(GenerationOutcome::Generated { first, .. }) => Ok(first),
        Some(GenerationOutcome::Failed(message)) => {
            Err(format!("expected generation to succeed, got error: {message}"))
        }
        None => Err(String::from("generation outcome should be set")),
    }
}

fn env_value(contents: &GeneratedContents, key: &str) -> StepResult<String> {
    contents
        .env_file
        .lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
        .map(str::to_owned)
        .ok_or_else(|| format!("{key} should be present in .env:\n{}", contents.env_file))
}

fn parse_override(contents: &GeneratedContents) -> StepResult<serde_yaml::Value> {
    serde_yaml::from_str(&contents.compose_override)
        .map_err(|error| format!("compose override should be valid YAML: {error}"))
}

#[then("the environment file lists every recognised key")]
fn env_file_lists_every_key(generation_state: &GenerationState) -> StepResult<()> {
    let contents = generated(generation_state)?;
    let keys: Vec<&str> = contents
        .env_file
        .lines()
        .filter_map(|line| line.split_once('=').map(|(key, _)| key))
        .collect();
    if keys == ENV_FILE_KEYS {
        Ok(())
    } else {
        Err(format!("unexpected .env keys: {keys:?}"))
    }
}

#[then("the environment file sets {key} to {value}")]
fn env_file_sets(generation_state: &GenerationState, key: String, value: String) -> StepResult<()> {
    let actual = env_value(&generated(generation_state)?, &key)?;
    if actual == value {
        Ok(())
    } else {
        Err(format!("expected {key}={value}, got {key}={actual}"))
    }
}

#[then("the environment file leaves {key} empty")]
fn env_file_leaves_empty(generation_state: &GenerationState, key: String) -> StepResult<()> {
    let actual = env_value(&generated(generation_state)?, &key)?;
    if actual.is_empty() {
        Ok(())
    } else {
        Err(format!("expected {key} to be empty, got {actual}"))
    }
}

#[then("the compose override is an empty document")]
fn override_is_empty(generation_state: &GenerationState) -> StepResult<()> {
    let contents = generated(generation_state)?;
    if contents.compose_override == "{}\n" {
        Ok(())
    } else {
        Err(format!(
            "expected an empty override, got:\n{}",
            contents.compose_override
        ))
    }
}

#[then("the compose override declares the volume {volume}")]
fn override_declares_volume(generation_state: &GenerationState, volume: String) -> StepResult<()> {
    let parsed = parse_override(&generated(generation_state)?)?;
    if parsed["volumes"][volume.as_str()].is_mapping() {
        Ok(())
    } else {
        Err(format!("volume {volume} should be declared"))
    }
}

#[then("the compose override mounts {mount}")]
fn override_mounts(generation_state: &GenerationState, mount: String) -> StepResult<()> {
    let parsed = parse_override(&generated(generation_state)?)?;
    for service in ["openclaw-gateway", "openclaw-cli"] {
        let mounted = parsed["services"][service]["volumes"]
            .as_sequence()
            .is_some_and(|volumes| volumes.iter().any(|entry| entry.as_str() == Some(mount.as_str())));
        if !mounted {
            return Err(format!("{service} should mount {mount}"));
        }
    }
    Ok(())
}

#[then("the compose override has no volumes key")]
fn override_has_no_volumes_key(generation_state: &GenerationState) -> StepResult<()> {
    let contents = generated(generation_state)?;
    match contents
        .compose_override
        .lines()
        .find(|line| line.trim_start().starts_with("volumes:"))
    {
        Some(line) => Err(format!("unexpected volumes key: {line:?}")),
        None => Ok(()),
    }
}

#[then("the resolved container user is {user}")]
fn resolved_container_user(generation_state: &GenerationState, user: String) -> StepResult<()> {
    let contents = generated(generation_state)?;
    let env_user = env_value(&contents, "OPENCLAW_CONTAINER_USER")?;
    if env_user != user {
        return Err(format!("expected .env user {user}, got {env_user}"));
    }
    let expected_line = format!("user: \"{user}\"");
    if contents.compose_override.contains(&expected_line) {
        Ok(())
    } else {
        Err(format!(
            "override should contain {expected_line}:\n{}",
            contents.compose_override
        ))
    }
}

#[then("generation fails naming the engine {engine}")]
fn generation_fails_naming_engine(
    generation_state: &GenerationState,
    engine: String,
) -> StepResult<()> {
    match generation_state.outcome.get() {
        Some(GenerationOutcome::Failed(message)) if message.contains(&format!("'{engine}'")) => {
            Ok(())
        }
        Some(GenerationOutcome::Failed(message)) => {
            Err(format!("error should name {engine}: {message}"))
        }
        Some(GenerationOutcome::Generated { .. }) => {
            Err(String::from("generation should have failed"))
        }
        None => Err(String::from("generation outcome should be set")),
    }
}

#[then("both runs wrote identical files")]
fn both_runs_identical(generation_state: &GenerationState) -> StepResult<()> {
    match generation_state.outcome.get() {
        Some(GenerationOutcome::Generated {
            first,
            second: Some(second),
        }) if first == second => Ok(()),
        Some(GenerationOutcome::Generated { .. }) => {
            Err(String::from("runs should produce identical files"))
        }
        Some(GenerationOutcome::Failed(message)) => Err(message),
        None => Err(String::from("generation outcome should be set")),
    }
}
