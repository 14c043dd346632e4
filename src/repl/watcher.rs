use crossbeam_channel::Sender;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches notation files and forwards change events to a channel.
/// notify runs its own background thread.
pub struct NotationWatcher {
    watcher: RecommendedWatcher,
    paths: Vec<PathBuf>,
}

impl NotationWatcher {
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // receiver gone means the REPL is shutting down
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            paths: Vec::new(),
        })
    }

    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let path = path.as_ref();
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
        Ok(())
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Notation lines of a watched file: trimmed, skipping blanks and `#` comments
pub fn notation_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_lines() {
        let contents = "# groove\nE(3,8)+1\n\n   B(5,13)>8  \n#E(1,4)\n";
        let lines: Vec<&str> = notation_lines(contents).collect();
        assert_eq!(lines, ["E(3,8)+1", "B(5,13)>8"]);
    }
}
