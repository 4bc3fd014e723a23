//! User-agent based device classification. Purely local, no I/O.

use super::snapshot::{Browser, DeviceClass, DeviceInfo, OperatingSystem};

pub fn classify_user_agent(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.to_lowercase();
    DeviceInfo {
        class: device_class(&ua),
        os: operating_system(&ua),
        agent: browser(&ua),
    }
}

fn device_class(ua: &str) -> DeviceClass {
    let android = ua.contains("android");
    if ua.contains("ipad") || ua.contains("tablet") || (android && !ua.contains("mobile")) {
        DeviceClass::Tablet
    } else if android || ["mobi", "iphone", "ipod"].iter().any(|m| ua.contains(m)) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

// iOS user agents also mention "Mac OS X" and Android ones "Linux"; order matters.
fn operating_system(ua: &str) -> OperatingSystem {
    if ua.contains("windows") {
        OperatingSystem::Windows
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        OperatingSystem::Ios
    } else if ua.contains("android") {
        OperatingSystem::Android
    } else if ua.contains("mac os x") || ua.contains("macintosh") {
        OperatingSystem::MacOs
    } else if ua.contains("linux") {
        OperatingSystem::Linux
    } else {
        OperatingSystem::Unknown
    }
}

// Chromium derivatives also advertise "chrome" and "safari".
fn browser(ua: &str) -> Browser {
    if ua.contains("edg/") || ua.contains("edga/") || ua.contains("edgios/") {
        Browser::Edge
    } else if ua.contains("opr/") || ua.contains("opera") {
        Browser::Opera
    } else if ua.contains("firefox") || ua.contains("fxios") {
        Browser::Firefox
    } else if ua.contains("chrome") || ua.contains("crios") {
        Browser::Chrome
    } else if ua.contains("safari") {
        Browser::Safari
    } else {
        Browser::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iphone_safari() {
        let info = classify_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
        );
        assert_eq!(info.class, DeviceClass::Mobile);
        assert_eq!(info.os, OperatingSystem::Ios);
        assert_eq!(info.agent, Browser::Safari);
    }

    #[test]
    fn android_tablet_chrome() {
        let info = classify_user_agent(
            "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
        );
        assert_eq!(info.class, DeviceClass::Tablet);
        assert_eq!(info.os, OperatingSystem::Android);
        assert_eq!(info.agent, Browser::Chrome);
    }

    #[test]
    fn windows_edge() {
        let info = classify_user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 Edg/120.0",
        );
        assert_eq!(info.class, DeviceClass::Desktop);
        assert_eq!(info.os, OperatingSystem::Windows);
        assert_eq!(info.agent, Browser::Edge);
    }

    #[test]
    fn unknown_agent() {
        let info = classify_user_agent("nudge-client/0.1.0");
        assert_eq!(info.class, DeviceClass::Desktop);
        assert_eq!(info.os, OperatingSystem::Unknown);
        assert_eq!(info.agent, Browser::Unknown);
    }
}
