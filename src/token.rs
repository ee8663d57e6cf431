use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Source location of a token or diagnostic.
///
/// `offset` is a byte offset into the full buffer; `line` and `column`
/// are 1-based, with columns counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Location of the first byte of a buffer.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// Reserved command and function names.
        ///
        /// Matching is exact and case-sensitive: `ENTRY` is a keyword,
        /// `Entry` is an identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Every keyword, in table order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Script spelling of the keyword.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    // Entry point and input files
    Entry => "ENTRY",
    Include => "INCLUDE",
    Input => "INPUT",
    Group => "GROUP",
    Output => "OUTPUT",
    SearchDir => "SEARCH_DIR",
    Startup => "STARTUP",
    AsNeeded => "AS_NEEDED",

    Insert => "INSERT",
    After => "AFTER",
    Before => "BEFORE",

    // Object file formats
    OutputFormat => "OUTPUT_FORMAT",
    Target => "TARGET",
    OutputArch => "OUTPUT_ARCH",

    Assert => "ASSERT",
    Extern => "EXTERN",
    ForceCommonAllocation => "FORCE_COMMON_ALLOCATION",
    InhibitCommonAllocation => "INHIBIT_COMMON_ALLOCATION",
    NoCrossRefs => "NOCROSSREFS",
    NoCrossRefsTo => "NOCROSSREFS_TO",
    RegionAlias => "REGION_ALIAS",

    // Symbol assignment
    Provide => "PROVIDE",
    Hidden => "HIDDEN",
    ProvideHidden => "PROVIDE_HIDDEN",

    // Top-level blocks
    Sections => "SECTIONS",
    Memory => "MEMORY",
    Phdrs => "PHDRS",
    Version => "VERSION",
    OverwriteSections => "OVERWRITE_SECTIONS",

    // Input section descriptions
    ExcludeFile => "EXCLUDE_FILE",
    Keep => "KEEP",
    InputSectionFlags => "INPUT_SECTION_FLAGS",
    Sort => "SORT",
    SortByName => "SORT_BY_NAME",
    SortByAlignment => "SORT_BY_ALIGNMENT",
    SortByInitPriority => "SORT_BY_INIT_PRIORITY",
    SortNone => "SORT_NONE",
    Constructors => "CONSTRUCTORS",

    // Output section attributes
    Overlay => "OVERLAY",
    NoLoad => "NOLOAD",
    Copy => "COPY",
    Info => "INFO",
    Dsect => "DSECT",
    SubAlign => "SUBALIGN",
    OnlyIfRo => "ONLY_IF_RO",
    OnlyIfRw => "ONLY_IF_RW",
    Fill => "FILL",

    // Output section data
    Byte => "BYTE",
    Short => "SHORT",
    Long => "LONG",
    Quad => "QUAD",

    // Builtin functions
    Absolute => "ABSOLUTE",
    Addr => "ADDR",
    Align => "ALIGN",
    AlignOf => "ALIGNOF",
    Block => "BLOCK",
    DataSegmentAlign => "DATA_SEGMENT_ALIGN",
    DataSegmentEnd => "DATA_SEGMENT_END",
    DataSegmentRelroEnd => "DATA_SEGMENT_RELRO_END",
    Defined => "DEFINED",
    Length => "LENGTH",
    LoadAddr => "LOADADDR",
    Log2Ceil => "LOG2CEIL",
    Max => "MAX",
    Min => "MIN",
    Origin => "ORIGIN",
    SegmentStart => "SEGMENT_START",
    SizeOf => "SIZEOF",
    SizeOfHeaders => "SIZEOF_HEADERS",

    // Program headers
    FileHdr => "FILEHDR",
    At => "AT",
    Flags => "FLAGS",

    // Version script labels
    VersionLocal => "local",
    VersionGlobal => "global",
    VersionExtern => "extern",
}

static KEYWORDS: LazyLock<HashMap<&'static str, Keyword>> =
    LazyLock::new(|| Keyword::ALL.iter().map(|&k| (k.as_str(), k)).collect());

impl Keyword {
    /// Look up the keyword spelled exactly `text`.
    #[must_use]
    pub fn lookup(text: &str) -> Option<Self> {
        KEYWORDS.get(text).copied()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Reserved command or function name.
    Keyword(Keyword),
    /// Bare word: symbol, section name, file name or glob.
    Identifier,
    /// The location counter `.`.
    Dot,
    /// Double-quoted literal; the text keeps both quotes.
    Quoted,

    /// `0x1F`, `0X1Fh`.
    Hex,
    /// `1Fh`.
    HexSuffix,
    /// `16`.
    Decimal,
    /// `4K`, scaled by 1024.
    DecimalK,
    /// `2M`, scaled by 1024 * 1024.
    DecimalM,

    /// `(`
    BracketBegin,
    /// `)`
    BracketEnd,
    /// `{`
    CurlyBegin,
    /// `}`
    CurlyEnd,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `*`
    Asterisk,
    /// `?`
    QuestionMark,

    /// `=`
    Assign,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `<<=`
    LeftShiftAssign,
    /// `>>=`
    RightShiftAssign,
    /// `&=`
    AndAssign,
    /// `^=`
    XorAssign,
    /// `|=`
    OrAssign,

    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `<<`
    LeftShift,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `>>`
    RightShift,
    /// `&`
    Ampersand,
    /// `&&`
    LogicalAnd,
    /// `|`
    VerticalBar,
    /// `||`
    LogicalOr,
    /// `^`
    Caret,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `~`
    Tilde,
    /// `!`
    Not,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,

    /// Input that cannot start any token.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Whether this kind is one of the numeric literal kinds.
    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(
            self,
            Self::Hex | Self::HexSuffix | Self::Decimal | Self::DecimalK | Self::DecimalM
        )
    }

    /// Whether this kind is a simple or compound assignment.
    #[must_use]
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::LeftShiftAssign
                | Self::RightShiftAssign
                | Self::AndAssign
                | Self::XorAssign
                | Self::OrAssign
        )
    }
}

/// A single token: its kind, the exact source text it covers, and where
/// that text starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub span: Span,
}

impl<'s> Token<'s> {
    /// Byte offset one past the end of the token.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.offset + self.text.len()
    }

    /// Contents of a quoted token without its surrounding quotes.
    ///
    /// Returns `None` for any other kind of token.
    #[must_use]
    pub fn unquoted(&self) -> Option<&'s str> {
        if self.kind != TokenKind::Quoted {
            return None;
        }
        self.text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
    }
}
