use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// (type name, doc line, name lookup fn, reverse lookup fn)
const CODE_TYPES: &[(&str, &str, &str, &str)] = &[
    (
        "KeyCode",
        "A keyboard usage (HID usage page 0x07, plus vendor keys such as fn).",
        "key_code_name",
        "key_code_from_name",
    ),
    (
        "ConsumerKeyCode",
        "A consumer-control usage (HID usage page 0x0C): media and brightness keys.",
        "consumer_key_code_name",
        "consumer_key_code_from_name",
    ),
    (
        "PointingButton",
        "A pointing device button, numbered from 1.",
        "pointing_button_name",
        "pointing_button_from_name",
    ),
];

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("code_types.rs");
    let mut f = File::create(&dest_path).unwrap();

    for (ty, doc, name_fn, from_name_fn) in CODE_TYPES {
        writeln!(
            f,
            r#"
/// {doc}
///
/// Newtype wrapper around the raw usage value. Names follow the
/// complex_modifications vocabulary (`left_shift`, `mute`, `button1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct {ty}(pub u32);

impl {ty} {{
    /// Get the raw usage value
    pub fn code(self) -> u32 {{
        self.0
    }}

    /// Get the name of this code, or "unknown" if it has none
    pub fn name(self) -> String {{
        {name_fn}(self.0)
    }}

    /// Look up a code by its name
    pub fn from_name(name: &str) -> Option<Self> {{
        {from_name_fn}(name)
    }}
}}

impl From<u32> for {ty} {{
    fn from(code: u32) -> Self {{
        {ty}(code)
    }}
}}

impl From<{ty}> for u32 {{
    fn from(value: {ty}) -> Self {{
        value.0
    }}
}}

impl fmt::Display for {ty} {{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{
        write!(f, "{{}}", self.name())
    }}
}}

impl FromStr for {ty} {{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {{
        {from_name_fn}(s).ok_or_else(|| format!("Unknown {ty} name: {{}}", s))
    }}
}}
"#
        )
        .unwrap();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
