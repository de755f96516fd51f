use crate::error::AppError;
use crate::storage::SlotStore;
use std::path::PathBuf;

const STORE_DIR_ENV_VAR: &str = "TASKLIST_STORE_DIR";
const SLOT_EXTENSION: &str = "json";

/// Keeps each slot in its own file under a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

pub fn store_dir() -> Result<PathBuf, AppError> {
    if let Ok(dir) = std::env::var(STORE_DIR_ENV_VAR)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("tasklist"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("tasklist"))
    }
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_dir()?))
    }

    pub fn slot_path(&self, key: &str) -> Result<PathBuf, AppError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{SLOT_EXTENSION}")))
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), AppError> {
    if key.is_empty() {
        return Err(AppError::invalid_input("slot key cannot be empty"));
    }

    let valid = key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        return Err(AppError::invalid_input(format!(
            "slot key '{key}' may only contain letters, digits, '-' and '_'"
        )));
    }

    Ok(())
}

impl SlotStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Ok(Some(content))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.slot_path(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, value)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::storage::SlotStore;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tasklist-{nanos}-{name}"))
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = temp_dir("missing-slot");
        let store = FileStore::new(&dir);

        assert_eq!(store.read("tasks").unwrap(), None);
        assert!(!dir.exists());
    }

    #[test]
    fn write_creates_directory_and_overwrites() {
        let dir = temp_dir("write-slot");
        let mut store = FileStore::new(&dir);

        store.write("tasks", "[]").unwrap();
        store.write("tasks", "[{\"id\":1}]").unwrap();
        let loaded = store.read("tasks").unwrap();
        let on_disk = std::fs::read_to_string(dir.join("tasks.json")).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.as_deref(), Some("[{\"id\":1}]"));
        assert_eq!(on_disk, "[{\"id\":1}]");
    }

    #[cfg(unix)]
    #[test]
    fn written_slot_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir("private-slot");
        let mut store = FileStore::new(&dir);
        store.write("tasks", "[]").unwrap();
        let mode = std::fs::metadata(dir.join("tasks.json"))
            .unwrap()
            .permissions()
            .mode();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let store = FileStore::new(temp_dir("bad-key"));

        assert_eq!(store.slot_path("../tasks").unwrap_err().code(), "invalid_input");
        assert_eq!(store.slot_path("").unwrap_err().code(), "invalid_input");
        assert!(store.slot_path("work-tasks_2").is_ok());
    }
}
