use super::*;
use std::io::Write;
use std::time::Duration;

use tempfile::Builder;

use crate::error::{AppError, ConfigError};

fn write_config(suffix: &str, content: &str) -> Result<tempfile::NamedTempFile, String> {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .map_err(|err| format!("tempfile failed: {}", err))?;
    file.write_all(content.as_bytes())
        .map_err(|err| format!("write failed: {}", err))?;
    Ok(file)
}

#[test]
fn parse_duration_value_units() -> Result<(), String> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("10s", Duration::from_secs(10)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
        ("15", Duration::from_secs(15)),
        (" 3s ", Duration::from_secs(3)),
    ];
    for (input, expected) in cases {
        let parsed =
            parse_duration_value(input).map_err(|err| format!("{} failed: {}", input, err))?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_value_rejects_bad_input() -> Result<(), String> {
    let cases = ["", "s10", "10d", "0s", "0"];
    for input in cases {
        if parse_duration_value(input).is_ok() {
            return Err(format!("Expected '{}' to be rejected", input));
        }
    }
    match parse_duration_value("5y") {
        Err(ConfigError::InvalidDurationUnit { unit }) if unit == "y" => Ok(()),
        other => Err(format!("Expected invalid unit, got {:?}", other)),
    }
}

#[test]
fn methods_and_user_agents_parse_case_insensitively() -> Result<(), String> {
    let method: HttpMethod = "pAtCh".parse().map_err(|err: ConfigError| err.to_string())?;
    if method != HttpMethod::Patch || method.as_str() != "PATCH" {
        return Err(format!("Unexpected method {}", method));
    }
    if "TRACE".parse::<HttpMethod>().is_ok() {
        return Err("TRACE should be rejected".to_owned());
    }
    let agent: UserAgent = "Firefox".parse().map_err(|err: ConfigError| err.to_string())?;
    if agent != UserAgent::Firefox || !agent.header_value().contains("Firefox") {
        return Err(format!("Unexpected user agent {:?}", agent));
    }
    if "netscape".parse::<UserAgent>().is_ok() {
        return Err("Unknown user agent should be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn load_toml_collection() -> Result<(), String> {
    let file = write_config(
        ".toml",
        r#"
name = "suite"

[[tests]]
name = "smoke"

[tests.global]
timeout = "30s"
retries = 2
retries_delay = "250ms"
think_time = 1

[tests.request]
method = "post"
uri = "http://localhost:8080/api"
user_agent = "chrome"
body = "{}"
headers = [{ name = "Accept", value = "application/json" }]
cookies = [{ name = "session", value = "abc" }, { name = "theme", value = "dark", secure = true }]

[[tests.phases]]
name = "ramp"
duration = "10s"
increment = "2s"
increment_vus = 5
target_vus = 10

[[tests.phases]]
name = "once"
single_request = true

[tests.phases.request]
uri = "http://localhost:8080/once"
"#,
    )?;

    let collection = load_config_file(file.path()).map_err(|err| err.to_string())?;
    if collection.name.as_deref() != Some("suite") {
        return Err("Collection name not loaded".to_owned());
    }
    let [test] = collection.tests.as_slice() else {
        return Err(format!("Expected one test, got {}", collection.tests.len()));
    };
    if test.request.method != HttpMethod::Post || test.request.user_agent != Some(UserAgent::Chrome)
    {
        return Err(format!("Unexpected request {:?}", test.request));
    }
    if test.request.cookie_header().as_deref() != Some("session=abc; theme=dark") {
        return Err("Cookies not loaded".to_owned());
    }

    let settings = test
        .global
        .as_ref()
        .ok_or("Missing global block")?
        .settings()
        .map_err(|err| err.to_string())?;
    let expected = GlobalSettings {
        timeout: Some(Duration::from_secs(30)),
        retries: 2,
        retries_delay: Duration::from_millis(250),
        think_time: Some(Duration::from_secs(1)),
    };
    if settings != expected {
        return Err(format!("Unexpected settings {:?}", settings));
    }

    let [ramp, once] = test.phases.as_slice() else {
        return Err(format!("Expected two phases, got {}", test.phases.len()));
    };
    if ramp.to_string() != "name:ramp | duration:10s | increment:2s | increment_vus:5 | target_vus:10"
    {
        return Err(format!("Unexpected phase rendering '{}'", ramp));
    }
    let override_uri = once.request.as_ref().map(|request| request.uri.as_str());
    if once.single_request != Some(true) || override_uri != Some("http://localhost:8080/once")
    {
        return Err(format!("Unexpected single-request phase {:?}", once));
    }
    Ok(())
}

#[test]
fn load_json_collection() -> Result<(), String> {
    let file = write_config(
        ".json",
        r#"{
  "tests": [
    {
      "request": { "uri": "http://localhost:8080/health" },
      "phases": [{ "duration": "5s", "target_vus": 3 }]
    }
  ]
}"#,
    )?;

    let collection = load_config_file(file.path()).map_err(|err| err.to_string())?;
    let test = collection.tests.first().ok_or("Missing test")?;
    if test.display_name() != "unnamed" || test.request.method != HttpMethod::Get {
        return Err(format!("Unexpected defaults {:?}", test));
    }
    if test.request.user_agent_header() != types::DEFAULT_USER_AGENT {
        return Err("Expected the default User-Agent".to_owned());
    }
    let phase = test.phases.first().ok_or("Missing phase")?;
    if phase.target_vus != Some(3) || phase.to_string() != "duration:5s | target_vus:3" {
        return Err(format!("Unexpected phase {:?}", phase));
    }
    if test.global.is_some() {
        return Err("Global block should be absent".to_owned());
    }
    Ok(())
}

#[test]
fn load_rejects_unknown_method() -> Result<(), String> {
    let file = write_config(
        ".toml",
        r#"
[[tests]]
[tests.request]
method = "brew"
uri = "http://localhost"
"#,
    )?;
    match load_config_file(file.path()) {
        Err(AppError::Config(ConfigError::ParseToml { .. })) => Ok(()),
        other => Err(format!("Expected TOML parse error, got {:?}", other)),
    }
}

#[test]
fn load_rejects_unsupported_extension() -> Result<(), String> {
    let file = write_config(".yaml", "tests: []")?;
    match load_config_file(file.path()) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(format!("Expected unsupported extension, got {:?}", other)),
    }
}

#[test]
fn global_settings_default_when_fields_missing() -> Result<(), String> {
    let settings = Global::default()
        .settings()
        .map_err(|err| err.to_string())?;
    if settings != GlobalSettings::default() {
        return Err(format!("Unexpected settings {:?}", settings));
    }
    let bad = Global {
        think_time: Some(DurationValue::Text("fast".to_owned())),
        ..Global::default()
    };
    if bad.settings().is_ok() {
        return Err("Malformed think_time should be rejected".to_owned());
    }
    Ok(())
}
