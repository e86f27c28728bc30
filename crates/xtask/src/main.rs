use anyhow::Context;
use serde::Deserialize;

/// Crates the domain must never depend on directly.
const DOMAIN_FORBIDDEN: &[&str] = &["tokio", "tokio-util", "sqlx", "dashmap", "tracing"];

#[derive(Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Deserialize)]
struct Dependency {
    name: String,
    kind: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata output")?;

    let violations = domain_violations(&metadata);
    if !violations.is_empty() {
        anyhow::bail!(
            "lifeforge-domain must stay free of infrastructure crates, found: {}",
            violations.join(", ")
        );
    }

    println!("arch-check: ok");
    Ok(())
}

fn domain_violations(metadata: &Metadata) -> Vec<String> {
    metadata
        .packages
        .iter()
        .filter(|p| p.name == "lifeforge-domain")
        .flat_map(|p| p.dependencies.iter())
        // dev-dependencies are allowed
        .filter(|d| d.kind.as_deref() != Some("dev"))
        .filter(|d| DOMAIN_FORBIDDEN.contains(&d.name.as_str()))
        .map(|d| d.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(json: &str) -> Metadata {
        serde_json::from_str(json).expect("valid metadata json")
    }

    #[test]
    fn clean_domain_has_no_violations() {
        let m = metadata(
            r#"{"packages":[{"name":"lifeforge-domain","dependencies":[
                {"name":"serde","kind":null},{"name":"serde_json","kind":"dev"}]}]}"#,
        );
        assert!(domain_violations(&m).is_empty());
    }

    #[test]
    fn runtime_dependency_is_reported() {
        let m = metadata(
            r#"{"packages":[{"name":"lifeforge-domain","dependencies":[
                {"name":"tokio","kind":null}]},
              {"name":"lifeforge-engine","dependencies":[{"name":"sqlx","kind":null}]}]}"#,
        );
        assert_eq!(domain_violations(&m), vec!["tokio".to_string()]);
    }
}
