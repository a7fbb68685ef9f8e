use crate::config;

pub fn load_settings() -> config::Settings {
    // First run: seed a config template so the track list has a home.
    if let Some(path) = config::resolve_config_path() {
        if let Err(e) = config::write_template(&path) {
            eprintln!("rondo: could not write config template: {e}");
        }
    }

    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("rondo: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("rondo: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
