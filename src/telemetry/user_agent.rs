//! User-agent classification via signature families
//!
//! A closed set of signature families, each an ordered list of
//! (pattern, name) pairs matched case-insensitively as substrings. Families
//! are evaluated in a fixed priority order with specialised clients before
//! generic browsers, so "Mozilla/5.0 ... Googlebot/2.1" classifies as a
//! crawler rather than whatever browser engine it impersonates. The first
//! matching signature wins. Unmatched input yields all-None fields.

/// Parse result for one user-agent string. All fields are optional: an
/// unrecognised or empty UA produces the default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAgentInfo {
    pub os: Option<String>,
    pub browser: Option<String>,
    pub browser_type: Option<String>,
    pub device: Option<String>,
    pub device_type: Option<String>,
}

struct Signature {
    pattern: &'static str,
    name: &'static str,
}

struct SignatureFamily {
    browser_type: &'static str,
    signatures: &'static [Signature],
}

macro_rules! signatures {
    ($(($pattern:expr, $name:expr)),* $(,)?) => {
        &[$(Signature { pattern: $pattern, name: $name }),*]
    };
}

const CRAWLERS: &[Signature] = signatures![
    ("googlebot", "Googlebot"),
    ("bingbot", "Bingbot"),
    ("yandexbot", "YandexBot"),
    ("baiduspider", "Baiduspider"),
    ("duckduckbot", "DuckDuckBot"),
    ("slurp", "Yahoo Slurp"),
    ("applebot", "Applebot"),
    ("ahrefsbot", "AhrefsBot"),
    ("semrushbot", "SemrushBot"),
    ("petalbot", "PetalBot"),
    ("gptbot", "GPTBot"),
    ("ccbot", "CCBot"),
];

const FETCHERS: &[Signature] = signatures![
    ("facebookexternalhit", "Facebook Link Preview"),
    ("twitterbot", "Twitter Link Preview"),
    ("telegrambot", "Telegram Link Preview"),
    ("discordbot", "Discord Link Preview"),
    ("slackbot", "Slack Link Preview"),
    ("whatsapp", "WhatsApp Link Preview"),
    ("feedfetcher", "Google Feedfetcher"),
    ("python-requests", "Python Requests"),
    ("python-urllib", "Python urllib"),
    ("go-http-client", "Go HTTP Client"),
    ("okhttp", "OkHttp"),
    ("axios", "Axios"),
    ("node-fetch", "Node Fetch"),
    ("libwww-perl", "libwww-perl"),
    ("java/", "Java HTTP Client"),
];

const CLI_CLIENTS: &[Signature] = signatures![
    ("curl/", "curl"),
    ("wget/", "Wget"),
    ("httpie", "HTTPie"),
    ("powershell", "PowerShell"),
];

const EMAIL_CLIENTS: &[Signature] = signatures![
    ("thunderbird", "Thunderbird"),
    ("microsoft outlook", "Outlook"),
    ("airmail", "Airmail"),
    ("postbox", "Postbox"),
    ("the bat!", "The Bat!"),
];

const IN_APP_BROWSERS: &[Signature] = signatures![
    ("instagram", "Instagram"),
    ("fban", "Facebook"),
    ("fbav", "Facebook"),
    ("micromessenger", "WeChat"),
    ("line/", "LINE"),
    ("snapchat", "Snapchat"),
    ("musical_ly", "TikTok"),
    ("bytedancewebview", "TikTok"),
    ("gsa/", "Google App"),
];

const MEDIA_PLAYERS: &[Signature] = signatures![
    ("vlc", "VLC"),
    ("itunes", "iTunes"),
    ("winamp", "Winamp"),
    ("sonos", "Sonos"),
    ("stagefright", "Stagefright"),
];

const VEHICLES: &[Signature] = signatures![
    ("tesla", "Tesla Browser"),
    ("qtcarbrowser", "Tesla Browser"),
    ("carplay", "CarPlay"),
    ("android auto", "Android Auto"),
];

const EXTRA_DEVICES: &[Signature] = signatures![
    ("playstation", "PlayStation Browser"),
    ("nintendo", "Nintendo Browser"),
    ("xbox", "Xbox Browser"),
    ("smart-tv", "Smart TV Browser"),
    ("smarttv", "Smart TV Browser"),
    ("roku", "Roku"),
    ("appletv", "Apple TV"),
    ("crkey", "Chromecast"),
];

// Generic browsers last, most specific token first: every Chromium
// derivative also carries "chrome", and almost everything carries "safari".
const BROWSERS: &[Signature] = signatures![
    ("edg", "Edge"),
    ("opr/", "Opera"),
    ("opera", "Opera"),
    ("samsungbrowser", "Samsung Internet"),
    ("vivaldi", "Vivaldi"),
    ("brave", "Brave"),
    ("yabrowser", "Yandex Browser"),
    ("firefox", "Firefox"),
    ("fxios", "Firefox"),
    ("crios", "Chrome"),
    ("chromium", "Chromium"),
    ("chrome", "Chrome"),
    ("safari", "Safari"),
    ("msie", "Internet Explorer"),
    ("trident", "Internet Explorer"),
];

/// Family evaluation order. Specialised clients shadow the generic browser
/// signatures they often embed.
const FAMILIES: &[SignatureFamily] = &[
    SignatureFamily { browser_type: "crawler", signatures: CRAWLERS },
    SignatureFamily { browser_type: "fetcher", signatures: FETCHERS },
    SignatureFamily { browser_type: "cli", signatures: CLI_CLIENTS },
    SignatureFamily { browser_type: "email", signatures: EMAIL_CLIENTS },
    SignatureFamily { browser_type: "inapp", signatures: IN_APP_BROWSERS },
    SignatureFamily { browser_type: "mediaplayer", signatures: MEDIA_PLAYERS },
    SignatureFamily { browser_type: "vehicle", signatures: VEHICLES },
    SignatureFamily { browser_type: "device", signatures: EXTRA_DEVICES },
    SignatureFamily { browser_type: "browser", signatures: BROWSERS },
];

const OS_SIGNATURES: &[Signature] = signatures![
    ("windows phone", "Windows Phone"),
    ("windows nt", "Windows"),
    ("iphone os", "iOS"),
    ("cpu os", "iPadOS"),
    ("ipad", "iPadOS"),
    ("iphone", "iOS"),
    ("mac os x", "macOS"),
    ("android", "Android"),
    ("cros", "ChromeOS"),
    ("ubuntu", "Ubuntu"),
    ("linux", "Linux"),
    ("freebsd", "FreeBSD"),
];

/// Classify a raw user-agent string. Never fails; anything unrecognised is
/// simply absent from the result.
pub fn classify(user_agent: &str) -> UserAgentInfo {
    let ua = user_agent.to_ascii_lowercase();
    if ua.is_empty() {
        return UserAgentInfo::default();
    }

    let mut info = UserAgentInfo::default();

    for family in FAMILIES {
        if let Some(sig) = family.signatures.iter().find(|s| ua.contains(s.pattern)) {
            info.browser = Some(sig.name.to_string());
            info.browser_type = Some(family.browser_type.to_string());
            break;
        }
    }

    if let Some(sig) = OS_SIGNATURES.iter().find(|s| ua.contains(s.pattern)) {
        info.os = Some(sig.name.to_string());
    }

    let (device, device_type) = detect_device(&ua, &info);
    info.device = device;
    info.device_type = device_type;

    info
}

fn detect_device(ua: &str, info: &UserAgentInfo) -> (Option<String>, Option<String>) {
    if ua.contains("ipad") {
        return (Some("iPad".into()), Some("tablet".into()));
    }
    if ua.contains("iphone") {
        return (Some("iPhone".into()), Some("mobile".into()));
    }
    if ua.contains("android") {
        // Android tablets drop the "Mobile" token.
        let device_type = if ua.contains("mobile") { "mobile" } else { "tablet" };
        return (Some("Android".into()), Some(device_type.into()));
    }
    // No model signal; only classify a form factor when something matched.
    if info.browser_type.as_deref() == Some("browser") {
        return (None, Some("desktop".into()));
    }
    (None, None)
}
