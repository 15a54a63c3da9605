use rand::distributions::Alphanumeric;
use rand::prelude::*;

/// A name for a scratch file that is renamed into place once fully written.
pub fn tmp_file_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("tmp_obj_{suffix}")
}
