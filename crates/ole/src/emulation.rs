/// Per-executable rendering-engine selection for the WebBrowser control.
///
/// The control renders in IE7 document mode unless the process opts in to a
/// newer engine through `FEATURE_BROWSER_EMULATION`, keyed by the file name of
/// the executable. This must be written before the first hosting object is
/// created in the process.
use std::path::Path;

use anyhow::Result;
use webhost_domain::EmulationMode;

pub const EMULATION_KEY: &str =
    r"Software\Microsoft\Internet Explorer\Main\FeatureControl\FEATURE_BROWSER_EMULATION";

/// Registry value name for `exe_path`: its bare file name.
pub fn emulation_value_name(exe_path: &Path) -> Option<String> {
    exe_path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(windows)]
pub fn apply_browser_emulation(mode: EmulationMode) -> Result<()> {
    use anyhow::{anyhow, Context};
    use windows::core::HSTRING;
    use windows::Win32::System::Registry::{RegSetKeyValueW, HKEY_CURRENT_USER, REG_DWORD};

    let Some(value) = mode.registry_value() else {
        tracing::debug!("browser emulation disabled");
        return Ok(());
    };

    let exe = std::env::current_exe().context("resolving executable path")?;
    let name = emulation_value_name(&exe)
        .ok_or_else(|| anyhow!("executable path has no file name: {}", exe.display()))?;

    let data = value.to_le_bytes();
    unsafe {
        RegSetKeyValueW(
            HKEY_CURRENT_USER,
            &HSTRING::from(EMULATION_KEY),
            &HSTRING::from(name.as_str()),
            REG_DWORD.0,
            Some(data.as_ptr().cast()),
            data.len() as u32,
        )
        .ok()
        .with_context(|| format!("writing {EMULATION_KEY}\\{name}"))?;
    }

    tracing::info!(exe = %name, value, "browser emulation configured");
    Ok(())
}

#[cfg(not(windows))]
pub fn apply_browser_emulation(mode: EmulationMode) -> Result<()> {
    tracing::debug!(?mode, "browser emulation is only meaningful on Windows");
    Ok(())
}
