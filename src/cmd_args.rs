use std::ffi::OsString;

pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Target URL, query string included
    url: String,

    /// Profile name
    /// Optional. Profile holding transport settings. Default is 'default'.
    /// If the profile is not configured, built-in defaults are used.
    #[clap(short = 'p', long, default_value = "default", help = "profile name")]
    profile: String,

    /// Request body, form (`a=1&b=2`) or JSON. Makes the request a POST.
    #[clap(short = 'd', long, help = "request body")]
    body: Option<String>,

    /// Header lines, repeatable
    #[clap(short = 'H', long = "header", help = "header line 'Key: Value'")]
    headers: Vec<String>,

    #[clap(short = 'c', long, help = "cookies 'name=value; ...'")]
    cookie: Option<String>,

    #[clap(long, help = "CSS selector to extract", conflicts_with = "regex")]
    css: Option<String>,

    #[clap(long, help = "regular expression to extract")]
    regex: Option<String>,

    #[clap(long, help = "print the prepared request and response metadata as JSON")]
    json: bool,

    /// Verbose mode
    /// Optional. Print verbose messages.
    #[clap(
        short = 'v',
        long,
        help = "Print verbose message",
        default_value = "false"
    )]
    verbose: bool,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    url: String,
    profile: String,
    body: Option<String>,
    headers: Vec<String>,
    cookie: Option<String>,
    css: Option<String>,
    regex: Option<String>,
    json: bool,
    verbose: bool,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            url: args.url,
            profile: args.profile,
            body: args.body,
            headers: args.headers,
            cookie: args.cookie,
            css: args.css,
            regex: args.regex,
            json: args.json,
            verbose: args.verbose,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn profile(&self) -> &String {
        &self.profile
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Header lines joined as header text, if any were given
    pub fn header_text(&self) -> Option<String> {
        (!self.headers.is_empty()).then(|| self.headers.join("\n"))
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn css(&self) -> Option<&str> {
        self.css.as_deref()
    }

    pub fn regex(&self) -> Option<&str> {
        self.regex.as_deref()
    }

    pub fn json(&self) -> bool {
        self.json
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
