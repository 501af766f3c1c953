/// Default location of the pin config file
pub const DEFAULT_CONFIG_PATH: &str = "config/pin.toml";

/// Config path from the first command-line argument, or `default`
pub fn get_config_path(default: &str) -> String {
    config_path_from(std::env::args().skip(1), default)
}

fn config_path_from<I: IntoIterator<Item = String>>(args: I, default: &str) -> String {
    args.into_iter().next().filter(|arg| !arg.trim().is_empty()).unwrap_or_else(|| default.to_string())
}
