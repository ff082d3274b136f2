//! Platform and browser capability tags plus the denial-remediation lookup.
//! The permission machine stays free of user-agent sniffing by taking these
//! through the `CapabilityProbe` seam.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Safari,
    Chrome,
    Firefox,
    Other,
}

/// Capability description provider injected into the permission machine.
pub trait CapabilityProbe: Send + Sync {
    fn platform(&self) -> Platform;
    fn browser(&self) -> Browser;
}

/// Fixed capability tags, handed in by whoever embeds the session.
pub struct StaticProbe {
    pub platform: Platform,
    pub browser: Browser,
}

impl CapabilityProbe for StaticProbe {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn browser(&self) -> Browser {
        self.browser
    }
}

const IOS_STEPS: &str = "iPhone/iPad (Safari):\n\
1. Open the iOS Settings app\n\
2. Scroll down to Safari\n\
3. Tap Camera\n\
4. Select Allow\n\
5. Return to the app and reload the page";

const CHROME_STEPS: &str = "Google Chrome:\n\
1. Click the lock icon in the address bar\n\
2. Find Camera\n\
3. Switch it to Allow\n\
4. Reload the page";

const SAFARI_STEPS: &str = "Safari (Mac):\n\
1. Open Safari Settings\n\
2. Click Websites\n\
3. Select Camera\n\
4. Find this site and switch it to Allow\n\
5. Reload the page";

const GENERIC_STEPS: &str = "Browser:\n\
1. Open the permission settings from the address bar\n\
2. Look for Camera\n\
3. Switch it to Allow\n\
4. Reload the page";

/// Human-readable steps for enabling camera access after a denial.
/// Pure lookup; iOS wins regardless of browser.
pub fn remediation_steps(platform: Platform, browser: Browser) -> &'static str {
    match (platform, browser) {
        (Platform::Ios, _) => IOS_STEPS,
        (_, Browser::Chrome) => CHROME_STEPS,
        (_, Browser::Safari) => SAFARI_STEPS,
        _ => GENERIC_STEPS,
    }
}
