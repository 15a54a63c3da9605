
use crate::commit::Identity;

pub const COMMIT_NAME: &str = "Jamie Quigley";
pub const COMMIT_EMAIL: &str = "jamie@quigley.xyz";

pub fn identity() -> Identity {
    Identity {
        name: COMMIT_NAME.to_owned(),
        email: COMMIT_EMAIL.to_owned(),
    }
}

/// Create files under `$root`, each containing `"<path>-contents\n"`.
#[macro_export]
macro_rules! create_test_files {
    ($root:ident, [$($path:expr),*]) => {{
        use std::io::Write;
        $({
            let path = $root.join($path);
            std::fs::create_dir_all(path.parent().unwrap())?;
            writeln!(std::fs::File::create(&path)?, "{}-contents", $path)?;
        })*
    }};
}
