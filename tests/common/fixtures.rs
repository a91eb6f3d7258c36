//! Test fixtures - reusable config and artifact constants for tests.

/// Basic config with two artifacts, setup script marked install
pub const CONFIG_BASIC: &str = r#"
[target]
host = "203.0.113.10"
user = "deploy"

[[artifacts]]
path = "deploy.tar.gz"

[[artifacts]]
path = "vps-setup.sh"
install = true
"#;

/// Config with StrictHostKeyChecking disabled
pub const CONFIG_INSECURE: &str = r#"
[target]
host = "203.0.113.10"
user = "deploy"

[transfer]
insecure_host_key = true

[[artifacts]]
path = "deploy.tar.gz"

[[artifacts]]
path = "vps-setup.sh"
install = true
"#;

/// Config with a custom remote directory
pub const CONFIG_CUSTOM_REMOTE_DIR: &str = r#"
[target]
host = "203.0.113.10"
user = "deploy"

[transfer]
remote_dir = "/srv/incoming"

[[artifacts]]
path = "deploy.tar.gz"

[[artifacts]]
path = "vps-setup.sh"
install = true
"#;

/// Config missing the target host (invalid)
pub const CONFIG_NO_HOST: &str = r#"
[target]
user = "deploy"

[[artifacts]]
path = "deploy.tar.gz"
"#;

/// Config with an optional extra artifact before the required ones
pub const CONFIG_OPTIONAL_EXTRA: &str = r#"
[target]
host = "203.0.113.10"
user = "deploy"

[[artifacts]]
path = "extras.tar.gz"
required = false

[[artifacts]]
path = "deploy.tar.gz"

[[artifacts]]
path = "vps-setup.sh"
install = true
"#;

/// Stand-in archive content (16 bytes)
pub const ARCHIVE_CONTENT: &str = "archive contents";

/// Stand-in install script content
pub const SETUP_SCRIPT: &str = "#!/bin/sh\necho setting up\n";
