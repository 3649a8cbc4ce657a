//! Hands display routes to the kiosk browser.

use classboard_core::{DisplayRoute, Navigator};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

/// Resolves routes against the display base URL and, when a browser command
/// is configured, launches it with the resulting URL. At most one browser is
/// kept alive; it is stopped before the next one starts, on leave, and on drop.
pub struct BrowserNavigator {
    base: Url,
    command: Vec<String>,
    browser: Mutex<Option<Child>>,
}

impl BrowserNavigator {
    pub fn new(base: Url, command: Vec<String>) -> Self {
        Self {
            base,
            command,
            browser: Mutex::new(None),
        }
    }

    pub fn resolve(&self, route: &DisplayRoute) -> Url {
        route.to_url(&self.base)
    }

    fn build_command(&self, url: &Url) -> Option<Command> {
        let (program, args) = self.command.split_first()?;
        let mut command = Command::new(program);
        command
            .args(args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null());
        Some(command)
    }

    /// Kill and reap the running browser, if any.
    fn stop_browser(browser: &mut Option<Child>) {
        let Some(mut child) = browser.take() else {
            return;
        };
        let pid = child.id();
        // kill fails once the process has exited on its own; it still needs reaping
        if let Err(e) = child.kill() {
            debug!("Browser {} already gone: {}", pid, e);
        }
        match child.wait() {
            Ok(status) => debug!("Browser {} stopped ({})", pid, status),
            Err(e) => warn!("Failed to reap browser {}: {}", pid, e),
        }
    }

    #[cfg(test)]
    fn browser_pid(&self) -> Option<u32> {
        self.browser
            .lock()
            .ok()
            .and_then(|browser| browser.as_ref().map(Child::id))
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, route: &DisplayRoute) {
        let url = self.resolve(route);
        info!("Displaying {}", url);

        let Some(mut command) = self.build_command(&url) else {
            return;
        };
        let mut browser = match self.browser.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Self::stop_browser(&mut browser);

        match command.spawn() {
            Ok(child) => *browser = Some(child),
            Err(e) => error!("Failed to launch browser {:?}: {}", self.command, e),
        }
    }

    fn leave(&self) {
        info!("Leaving display, back to pairing screen");
        let mut browser = match self.browser.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Self::stop_browser(&mut browser);
    }
}

impl Drop for BrowserNavigator {
    fn drop(&mut self) {
        let browser = match self.browser.get_mut() {
            Ok(browser) => browser,
            Err(poisoned) => poisoned.into_inner(),
        };
        Self::stop_browser(browser);
    }
}
