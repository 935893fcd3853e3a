//! Activity log object model and its reader.
//!
//! The token stream of an activity log is a depth-first dump of Xcode's
//! `IDEActivityLogSection` tree. Objects are introduced by a class name
//! reference and followed by their fields in a fixed order; collections are
//! a `list` count (or `null` for an empty collection) followed by that many
//! objects. Nothing in the stream names the fields, so the reader has to
//! consume them in exactly the order Xcode writes them.
//!
//! All strings borrow from the lexed input.

use crate::error::BuildLogError;
use crate::lexer::{SlfWriter, Token};

/// First log version that records section attachments.
pub const ATTACHMENTS_MIN_VERSION: u64 = 11;

const ATTACHMENT_CLASS: &str = "IDEFoundation.IDEActivityLogSectionAttachment";

/// Deepest nesting of sections or messages accepted before the log is
/// rejected as malformed.
const MAX_NESTING: usize = 128;

/// A parsed activity log: the format version and the root section.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLog<'a> {
    pub version: u64,
    pub main_section: LogSection<'a>,
}

/// Concrete class of a section object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionClass {
    #[default]
    Section,
    CommandLineBuildLog,
    MajorGroup,
    CommandInvocation,
    UnitTest,
}

impl SectionClass {
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Section => "IDEActivityLogSection",
            Self::CommandLineBuildLog => "IDECommandLineBuildLog",
            Self::MajorGroup => "IDEActivityLogMajorGroupSection",
            Self::CommandInvocation => "IDEActivityLogCommandInvocationSection",
            Self::UnitTest => "IDEActivityLogUnitTestSection",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        [
            Self::Section,
            Self::CommandLineBuildLog,
            Self::MajorGroup,
            Self::CommandInvocation,
            Self::UnitTest,
        ]
        .into_iter()
        .find(|class| class.class_name() == name)
    }
}

/// One timed activity: the whole build, a target, or a single command.
///
/// Recording times are seconds since 2001-01-01T00:00:00Z.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogSection<'a> {
    pub class: SectionClass,
    pub section_type: u64,
    pub domain_type: &'a str,
    pub title: &'a str,
    pub signature: &'a str,
    pub time_started_recording: f64,
    pub time_stopped_recording: f64,
    pub sub_sections: Vec<LogSection<'a>>,
    pub text: &'a str,
    pub messages: Vec<LogMessage<'a>>,
    pub was_cancelled: bool,
    pub is_quiet: bool,
    pub was_fetched_from_cache: bool,
    pub subtitle: &'a str,
    pub location: Option<DocumentLocation<'a>>,
    pub command_detail_desc: &'a str,
    pub unique_identifier: &'a str,
    pub localized_result_string: &'a str,
    pub xcbuild_signature: &'a str,
    /// Only present from [`ATTACHMENTS_MIN_VERSION`] on.
    pub attachments: Vec<SectionAttachment<'a>>,
    /// Set for [`SectionClass::UnitTest`] sections.
    pub unit_test: Option<UnitTestDetails<'a>>,
    /// Trailing integer written after [`SectionClass::CommandLineBuildLog`]
    /// sections.
    pub command_line_trailer: u64,
}

/// Extra fields of a unit test section, all stored as strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitTestDetails<'a> {
    pub tests_passed: &'a str,
    pub duration: &'a str,
    pub summary: &'a str,
    pub suite_name: &'a str,
    pub test_name: &'a str,
    pub performance_test_output: &'a str,
}

/// Versioned blob attached to a section (task metrics, build timing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAttachment<'a> {
    pub identifier: &'a str,
    pub major_version: u64,
    pub minor_version: u64,
    pub payload: &'a str,
}

/// Severity levels used by [`LogMessage::severity`].
pub const SEVERITY_WARNING: u64 = 1;
pub const SEVERITY_ERROR: u64 = 2;

/// A diagnostic emitted while a section was recording.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogMessage<'a> {
    pub detail: MessageDetail<'a>,
    pub title: &'a str,
    pub short_title: &'a str,
    pub time_emitted: f64,
    pub range_end_in_section_text: u64,
    pub range_start_in_section_text: u64,
    pub sub_messages: Vec<LogMessage<'a>>,
    pub severity: u64,
    pub message_type: &'a str,
    pub location: Option<DocumentLocation<'a>>,
    pub category_ident: &'a str,
    pub secondary_locations: Vec<DocumentLocation<'a>>,
    pub additional_description: &'a str,
}

impl LogMessage<'_> {
    pub const fn is_warning(&self) -> bool {
        self.severity == SEVERITY_WARNING
    }

    pub const fn is_error(&self) -> bool {
        self.severity == SEVERITY_ERROR
    }
}

/// Message class plus the fields only that class carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageDetail<'a> {
    #[default]
    Plain,
    AnalyzerWarning,
    Action {
        action: &'a str,
    },
    AnalyzerResult {
        result_type: &'a str,
        key_event_index: u64,
    },
}

impl MessageDetail<'_> {
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Plain => "IDEActivityLogMessage",
            Self::AnalyzerWarning => "IDEActivityLogAnalyzerWarningMessage",
            Self::Action { .. } => "IDEActivityLogActionMessage",
            Self::AnalyzerResult { .. } => "IDEActivityLogAnalyzerResultMessage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageClass {
    Plain,
    AnalyzerWarning,
    Action,
    AnalyzerResult,
}

impl MessageClass {
    fn from_class_name(name: &str) -> Option<Self> {
        match name {
            "IDEActivityLogMessage" => Some(Self::Plain),
            "IDEActivityLogAnalyzerWarningMessage" => Some(Self::AnalyzerWarning),
            "IDEActivityLogActionMessage" => Some(Self::Action),
            "IDEActivityLogAnalyzerResultMessage" => Some(Self::AnalyzerResult),
            _ => None,
        }
    }
}

/// Text range inside a document, as recorded by `DVTTextDocumentLocation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    pub starting_line: u64,
    pub starting_column: u64,
    pub ending_line: u64,
    pub ending_column: u64,
    pub character_range_end: u64,
    pub character_range_start: u64,
    pub location_encoding: u64,
}

/// Where a section or message points in the source tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLocation<'a> {
    Document {
        url: &'a str,
        timestamp: f64,
    },
    Text {
        url: &'a str,
        timestamp: f64,
        range: TextRange,
    },
    Log {
        url: &'a str,
        timestamp: f64,
        expression: &'a str,
    },
    Member {
        url: &'a str,
        timestamp: f64,
        member: &'a str,
    },
}

impl<'a> DocumentLocation<'a> {
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Document { .. } => "DVTDocumentLocation",
            Self::Text { .. } => "DVTTextDocumentLocation",
            Self::Log { .. } => "IDELogDocumentLocation",
            Self::Member { .. } => "DVTMemberDocumentLocation",
        }
    }

    pub const fn url(&self) -> &'a str {
        match *self {
            Self::Document { url, .. }
            | Self::Text { url, .. }
            | Self::Log { url, .. }
            | Self::Member { url, .. } => url,
        }
    }

    const fn timestamp(&self) -> f64 {
        match *self {
            Self::Document { timestamp, .. }
            | Self::Text { timestamp, .. }
            | Self::Log { timestamp, .. }
            | Self::Member { timestamp, .. } => timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocationClass {
    Document,
    Text,
    Log,
    Member,
}

impl LocationClass {
    fn from_class_name(name: &str) -> Option<Self> {
        match name {
            "DVTDocumentLocation" => Some(Self::Document),
            "DVTTextDocumentLocation" => Some(Self::Text),
            "IDELogDocumentLocation" => Some(Self::Log),
            "DVTMemberDocumentLocation" => Some(Self::Member),
            _ => None,
        }
    }
}

/// Reads the activity log object graph out of a token stream.
///
/// Tokens after the main section are ignored.
pub fn parse_activity_log<'a>(tokens: &[Token<'a>]) -> Result<ActivityLog<'a>, BuildLogError> {
    let mut cursor = TokenCursor::new(tokens);
    let version = cursor.int("log version")?;
    let mut reader = ActivityReader {
        cursor,
        version,
        depth: 0,
    };
    let main_section = reader.section()?;

    let remaining = reader.cursor.remaining();
    if remaining > 0 {
        tracing::trace!(remaining, "ignoring tokens after main section");
    }

    Ok(ActivityLog {
        version,
        main_section,
    })
}

/// Sequential reader over a token slice with typed accessors.
struct TokenCursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> TokenCursor<'t, 'a> {
    const fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    const fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self, field: &str) -> Result<Token<'a>, BuildLogError> {
        let token = self.peek().ok_or_else(|| {
            BuildLogError::mismatch(format!("log ended while reading {field}"))
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn int(&mut self, field: &str) -> Result<u64, BuildLogError> {
        match self.next(field)? {
            Token::Int(value) => Ok(value),
            other => Err(unexpected(field, "an int", other)),
        }
    }

    fn double(&mut self, field: &str) -> Result<f64, BuildLogError> {
        match self.next(field)? {
            Token::Double(value) => Ok(value),
            other => Err(unexpected(field, "a double", other)),
        }
    }

    /// A string, with `null` standing for the empty string.
    fn string(&mut self, field: &str) -> Result<&'a str, BuildLogError> {
        match self.next(field)? {
            Token::String(value) => Ok(value),
            Token::Null => Ok(""),
            other => Err(unexpected(field, "a string", other)),
        }
    }

    fn boolean(&mut self, field: &str) -> Result<bool, BuildLogError> {
        match self.next(field)? {
            Token::Int(0) => Ok(false),
            Token::Int(1) => Ok(true),
            other => Err(unexpected(field, "a boolean", other)),
        }
    }

    /// Element count of a collection; `null` is an empty collection.
    fn list_len(&mut self, field: &str) -> Result<usize, BuildLogError> {
        match self.next(field)? {
            Token::List(count) => Ok(count),
            Token::Null => Ok(0),
            other => Err(unexpected(field, "a list", other)),
        }
    }

    /// Class of the next object. The first use of a class is written as its
    /// definition followed by a reference; the definition is skipped.
    fn class_ref(&mut self, field: &str) -> Result<&'a str, BuildLogError> {
        let token = match self.next(field)? {
            Token::ClassName(_) => self.next(field)?,
            token => token,
        };
        match token {
            Token::ClassNameRef(name) => Ok(name),
            other => Err(unexpected(field, "a class name reference", other)),
        }
    }

    fn skip_null(&mut self) -> bool {
        if self.peek() == Some(Token::Null) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

fn unexpected(field: &str, expected: &str, found: Token<'_>) -> BuildLogError {
    BuildLogError::mismatch(format!("expected {expected} for {field}, found {found}"))
}

struct ActivityReader<'t, 'a> {
    cursor: TokenCursor<'t, 'a>,
    version: u64,
    depth: usize,
}

impl<'a> ActivityReader<'_, 'a> {
    fn descend(&mut self, field: &str) -> Result<(), BuildLogError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(BuildLogError::mismatch(format!("{field} nested too deeply")));
        }
        Ok(())
    }

    fn section(&mut self) -> Result<LogSection<'a>, BuildLogError> {
        let class_name = self.cursor.class_ref("section")?;
        let class = SectionClass::from_class_name(class_name).ok_or_else(|| {
            BuildLogError::mismatch(format!("unexpected section class {class_name}"))
        })?;

        let c = &mut self.cursor;
        let section_type = c.int("section type")?;
        let domain_type = c.string("domain type")?;
        let title = c.string("title")?;
        let signature = c.string("signature")?;
        let time_started_recording = c.double("start time")?;
        let time_stopped_recording = c.double("stop time")?;
        let sub_sections = self.sections()?;

        let c = &mut self.cursor;
        let text = c.string("text")?;
        let messages = self.messages("messages")?;

        let c = &mut self.cursor;
        let was_cancelled = c.boolean("was cancelled")?;
        let is_quiet = c.boolean("is quiet")?;
        let was_fetched_from_cache = c.boolean("was fetched from cache")?;
        let subtitle = c.string("subtitle")?;
        let location = self.location("section location")?;

        let c = &mut self.cursor;
        let command_detail_desc = c.string("command detail")?;
        let unique_identifier = c.string("unique identifier")?;
        let localized_result_string = c.string("localized result")?;
        let xcbuild_signature = c.string("xcbuild signature")?;
        let attachments = if self.version >= ATTACHMENTS_MIN_VERSION {
            self.attachments()?
        } else {
            Vec::new()
        };

        let unit_test = if class == SectionClass::UnitTest {
            Some(self.unit_test_details()?)
        } else {
            None
        };
        let command_line_trailer = if class == SectionClass::CommandLineBuildLog {
            self.cursor.int("command line log trailer")?
        } else {
            0
        };

        Ok(LogSection {
            class,
            section_type,
            domain_type,
            title,
            signature,
            time_started_recording,
            time_stopped_recording,
            sub_sections,
            text,
            messages,
            was_cancelled,
            is_quiet,
            was_fetched_from_cache,
            subtitle,
            location,
            command_detail_desc,
            unique_identifier,
            localized_result_string,
            xcbuild_signature,
            attachments,
            unit_test,
            command_line_trailer,
        })
    }

    fn sections(&mut self) -> Result<Vec<LogSection<'a>>, BuildLogError> {
        let count = self.cursor.list_len("sub-sections")?;
        self.descend("sections")?;
        let mut sections = Vec::with_capacity(count.min(self.cursor.remaining()));
        for _ in 0..count {
            sections.push(self.section()?);
        }
        self.depth -= 1;
        Ok(sections)
    }

    fn unit_test_details(&mut self) -> Result<UnitTestDetails<'a>, BuildLogError> {
        let c = &mut self.cursor;
        Ok(UnitTestDetails {
            tests_passed: c.string("tests passed")?,
            duration: c.string("test duration")?,
            summary: c.string("test summary")?,
            suite_name: c.string("suite name")?,
            test_name: c.string("test name")?,
            performance_test_output: c.string("performance test output")?,
        })
    }

    fn attachments(&mut self) -> Result<Vec<SectionAttachment<'a>>, BuildLogError> {
        let count = self.cursor.list_len("attachments")?;
        let mut attachments = Vec::with_capacity(count.min(self.cursor.remaining()));
        for _ in 0..count {
            let class_name = self.cursor.class_ref("attachment")?;
            if class_name != ATTACHMENT_CLASS {
                return Err(BuildLogError::mismatch(format!(
                    "unexpected attachment class {class_name}"
                )));
            }
            let c = &mut self.cursor;
            attachments.push(SectionAttachment {
                identifier: c.string("attachment identifier")?,
                major_version: c.int("attachment major version")?,
                minor_version: c.int("attachment minor version")?,
                payload: c.string("attachment payload")?,
            });
        }
        Ok(attachments)
    }

    fn messages(&mut self, field: &str) -> Result<Vec<LogMessage<'a>>, BuildLogError> {
        let count = self.cursor.list_len(field)?;
        self.descend(field)?;
        let mut messages = Vec::with_capacity(count.min(self.cursor.remaining()));
        for _ in 0..count {
            messages.push(self.message()?);
        }
        self.depth -= 1;
        Ok(messages)
    }

    fn message(&mut self) -> Result<LogMessage<'a>, BuildLogError> {
        let class_name = self.cursor.class_ref("message")?;
        let class = MessageClass::from_class_name(class_name).ok_or_else(|| {
            BuildLogError::mismatch(format!("unexpected message class {class_name}"))
        })?;

        let c = &mut self.cursor;
        let title = c.string("message title")?;
        let short_title = c.string("message short title")?;
        let time_emitted = c.double("message time")?;
        let range_end_in_section_text = c.int("message range end")?;
        let range_start_in_section_text = c.int("message range start")?;
        let sub_messages = self.messages("sub-messages")?;
        let severity = self.cursor.int("message severity")?;
        let message_type = self.cursor.string("message type")?;
        let location = self.location("message location")?;
        let category_ident = self.cursor.string("message category")?;
        let secondary_locations = self.secondary_locations()?;
        let additional_description = self.cursor.string("message description")?;

        let c = &mut self.cursor;
        let detail = match class {
            MessageClass::Plain => MessageDetail::Plain,
            MessageClass::AnalyzerWarning => MessageDetail::AnalyzerWarning,
            MessageClass::Action => MessageDetail::Action {
                action: c.string("message action")?,
            },
            MessageClass::AnalyzerResult => MessageDetail::AnalyzerResult {
                result_type: c.string("analyzer result type")?,
                key_event_index: c.int("analyzer key event index")?,
            },
        };

        Ok(LogMessage {
            detail,
            title,
            short_title,
            time_emitted,
            range_end_in_section_text,
            range_start_in_section_text,
            sub_messages,
            severity,
            message_type,
            location,
            category_ident,
            secondary_locations,
            additional_description,
        })
    }

    fn secondary_locations(&mut self) -> Result<Vec<DocumentLocation<'a>>, BuildLogError> {
        let count = self.cursor.list_len("secondary locations")?;
        let mut locations = Vec::with_capacity(count.min(self.cursor.remaining()));
        for _ in 0..count {
            let location = self.location("secondary location")?.ok_or_else(|| {
                BuildLogError::mismatch("null entry in secondary locations")
            })?;
            locations.push(location);
        }
        Ok(locations)
    }

    fn location(&mut self, field: &str) -> Result<Option<DocumentLocation<'a>>, BuildLogError> {
        if self.cursor.skip_null() {
            return Ok(None);
        }
        let class_name = self.cursor.class_ref(field)?;
        let class = LocationClass::from_class_name(class_name).ok_or_else(|| {
            BuildLogError::mismatch(format!("unexpected location class {class_name}"))
        })?;

        let c = &mut self.cursor;
        let url = c.string("document url")?;
        let timestamp = c.double("document timestamp")?;
        let location = match class {
            LocationClass::Document => DocumentLocation::Document { url, timestamp },
            LocationClass::Text => DocumentLocation::Text {
                url,
                timestamp,
                range: TextRange {
                    starting_line: c.int("starting line")?,
                    starting_column: c.int("starting column")?,
                    ending_line: c.int("ending line")?,
                    ending_column: c.int("ending column")?,
                    character_range_end: c.int("character range end")?,
                    character_range_start: c.int("character range start")?,
                    location_encoding: c.int("location encoding")?,
                },
            },
            LocationClass::Log => DocumentLocation::Log {
                url,
                timestamp,
                expression: c.string("location expression")?,
            },
            LocationClass::Member => DocumentLocation::Member {
                url,
                timestamp,
                member: c.string("location member")?,
            },
        };
        Ok(Some(location))
    }
}

impl ActivityLog<'_> {
    /// Serializes the log back into SLF text.
    ///
    /// Empty sub-section collections are written as `null`, everything else
    /// as a counted list. Attachments are dropped for versions that do not
    /// record them.
    pub fn to_slf(&self) -> String {
        let mut w = SlfWriter::new();
        w.int(self.version);
        write_section(&mut w, &self.main_section, self.version);
        w.finish()
    }
}

fn write_section(w: &mut SlfWriter, section: &LogSection<'_>, version: u64) {
    w.class(section.class.class_name())
        .int(section.section_type)
        .string(section.domain_type)
        .string(section.title)
        .string(section.signature)
        .double(section.time_started_recording)
        .double(section.time_stopped_recording);

    if section.sub_sections.is_empty() {
        w.null();
    } else {
        w.list(section.sub_sections.len());
        for sub_section in &section.sub_sections {
            write_section(w, sub_section, version);
        }
    }

    w.string(section.text);
    write_messages(w, &section.messages);
    w.boolean(section.was_cancelled)
        .boolean(section.is_quiet)
        .boolean(section.was_fetched_from_cache)
        .string(section.subtitle);
    write_location(w, section.location.as_ref());
    w.string(section.command_detail_desc)
        .string(section.unique_identifier)
        .string(section.localized_result_string)
        .string(section.xcbuild_signature);

    if version >= ATTACHMENTS_MIN_VERSION {
        w.list(section.attachments.len());
        for attachment in &section.attachments {
            w.class(ATTACHMENT_CLASS)
                .string(attachment.identifier)
                .int(attachment.major_version)
                .int(attachment.minor_version)
                .string(attachment.payload);
        }
    }

    match section.class {
        SectionClass::UnitTest => {
            let details = section.unit_test.clone().unwrap_or_default();
            w.string(details.tests_passed)
                .string(details.duration)
                .string(details.summary)
                .string(details.suite_name)
                .string(details.test_name)
                .string(details.performance_test_output);
        }
        SectionClass::CommandLineBuildLog => {
            w.int(section.command_line_trailer);
        }
        SectionClass::Section | SectionClass::MajorGroup | SectionClass::CommandInvocation => {}
    }
}

fn write_messages(w: &mut SlfWriter, messages: &[LogMessage<'_>]) {
    w.list(messages.len());
    for message in messages {
        w.class(message.detail.class_name())
            .string(message.title)
            .string(message.short_title)
            .double(message.time_emitted)
            .int(message.range_end_in_section_text)
            .int(message.range_start_in_section_text);
        write_messages(w, &message.sub_messages);
        w.int(message.severity).string(message.message_type);
        write_location(w, message.location.as_ref());
        w.string(message.category_ident);
        w.list(message.secondary_locations.len());
        for location in &message.secondary_locations {
            write_location(w, Some(location));
        }
        w.string(message.additional_description);
        match message.detail {
            MessageDetail::Plain | MessageDetail::AnalyzerWarning => {}
            MessageDetail::Action { action } => {
                w.string(action);
            }
            MessageDetail::AnalyzerResult {
                result_type,
                key_event_index,
            } => {
                w.string(result_type).int(key_event_index);
            }
        }
    }
}

fn write_location(w: &mut SlfWriter, location: Option<&DocumentLocation<'_>>) {
    let Some(location) = location else {
        w.null();
        return;
    };
    w.class(location.class_name())
        .string(location.url())
        .double(location.timestamp());
    match *location {
        DocumentLocation::Document { .. } => {}
        DocumentLocation::Text { range, .. } => {
            w.int(range.starting_line)
                .int(range.starting_column)
                .int(range.ending_line)
                .int(range.ending_column)
                .int(range.character_range_end)
                .int(range.character_range_start)
                .int(range.location_encoding);
        }
        DocumentLocation::Log { expression, .. } => {
            w.string(expression);
        }
        DocumentLocation::Member { member, .. } => {
            w.string(member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(text: &str) -> Result<ActivityLog<'_>, BuildLogError> {
        let tokens = tokenize(text)?;
        parse_activity_log(&tokens)
    }

    fn warning(title: &'static str) -> LogMessage<'static> {
        LogMessage {
            title,
            severity: SEVERITY_WARNING,
            message_type: "com.apple.dt.IDE.diagnostic",
            location: Some(DocumentLocation::Text {
                url: "file:///tmp/App/a.swift",
                timestamp: 654_000_000.5,
                range: TextRange {
                    starting_line: 3,
                    starting_column: 7,
                    ending_line: 3,
                    ending_column: 12,
                    character_range_end: u64::from(u32::MAX),
                    character_range_start: 0,
                    location_encoding: 1,
                },
            }),
            ..LogMessage::default()
        }
    }

    fn sample_log(version: u64) -> ActivityLog<'static> {
        let compile = LogSection {
            class: SectionClass::CommandInvocation,
            section_type: 2,
            domain_type: "com.apple.dt.IDE.BuildLogSection",
            title: "Compile a.swift",
            signature: "CompileSwift normal arm64 /tmp/App/a.swift",
            time_started_recording: 654_000_001.0,
            time_stopped_recording: 654_000_003.25,
            messages: vec![warning("unused variable")],
            was_fetched_from_cache: true,
            location: Some(DocumentLocation::Document {
                url: "file:///tmp/App/a.swift",
                timestamp: 0.0,
            }),
            attachments: vec![SectionAttachment {
                identifier: "com.apple.dt.ActivityLogSectionAttachment.TaskMetrics",
                major_version: 1,
                minor_version: 0,
                payload: "{\"wcDuration\":2250000}",
            }],
            ..LogSection::default()
        };
        let test = LogSection {
            class: SectionClass::UnitTest,
            title: "Run test",
            unit_test: Some(UnitTestDetails {
                tests_passed: "1",
                duration: "0.01",
                summary: "Executed 1 test",
                suite_name: "AppTests",
                test_name: "testLaunch",
                performance_test_output: "",
            }),
            ..LogSection::default()
        };
        let target = LogSection {
            class: SectionClass::MajorGroup,
            title: "Build target App",
            time_started_recording: 654_000_000.0,
            time_stopped_recording: 654_000_004.0,
            sub_sections: vec![compile, test],
            messages: vec![LogMessage {
                detail: MessageDetail::Action { action: "Fix" },
                title: "deprecated",
                location: Some(DocumentLocation::Log {
                    url: "",
                    timestamp: 1.0,
                    expression: "x",
                }),
                secondary_locations: vec![DocumentLocation::Member {
                    url: "file:///tmp/App/b.swift",
                    timestamp: 2.0,
                    member: "body",
                }],
                sub_messages: vec![LogMessage {
                    detail: MessageDetail::AnalyzerResult {
                        result_type: "Dead store",
                        key_event_index: 4,
                    },
                    severity: SEVERITY_ERROR,
                    ..LogMessage::default()
                }],
                ..LogMessage::default()
            }],
            ..LogSection::default()
        };
        ActivityLog {
            version,
            main_section: LogSection {
                class: SectionClass::CommandLineBuildLog,
                title: "Build App",
                time_started_recording: 654_000_000.0,
                time_stopped_recording: 654_000_005.0,
                sub_sections: vec![target],
                command_line_trailer: 7,
                ..LogSection::default()
            },
        }
    }

    #[test]
    fn reads_back_every_object_kind() {
        let log = sample_log(11);
        let text = log.to_slf();
        assert_eq!(parse(&text).unwrap(), log);
    }

    #[test]
    fn attachments_are_not_read_before_version_11() {
        let log = sample_log(10);
        let text = log.to_slf();
        let parsed = parse(&text).unwrap();

        let compile = &parsed.main_section.sub_sections[0].sub_sections[0];
        assert!(compile.attachments.is_empty());
        assert_eq!(compile.title, "Compile a.swift");
        assert!(compile.was_fetched_from_cache);
    }

    #[test]
    fn unit_test_section_reads_trailing_strings() {
        let text = sample_log(11).to_slf();
        let parsed = parse(&text).unwrap();
        let test = &parsed.main_section.sub_sections[0].sub_sections[1];
        let details = test.unit_test.as_ref().unwrap();
        assert_eq!(details.suite_name, "AppTests");
        assert_eq!(details.test_name, "testLaunch");
        assert_eq!(details.performance_test_output, "");
    }

    #[test]
    fn null_strings_read_as_empty() {
        let mut w = SlfWriter::new();
        w.int(10)
            .class("IDEActivityLogSection")
            .int(0)
            .null()
            .null()
            .null()
            .double(1.0)
            .double(2.0)
            .null()
            .null()
            .null()
            .boolean(false)
            .boolean(false)
            .boolean(false)
            .null()
            .null()
            .null()
            .null()
            .null()
            .null();
        let text = w.finish();
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.main_section.title, "");
        assert!(parsed.main_section.sub_sections.is_empty());
        assert!(parsed.main_section.messages.is_empty());
        assert!(parsed.main_section.location.is_none());
    }

    #[test]
    fn unknown_section_class_is_a_mismatch() {
        let text = sample_log(11)
            .to_slf()
            .replace("22%IDECommandLineBuildLog", "22%IDECommandLineBuildLoq");
        let err = parse(&text).unwrap_err();
        assert!(
            matches!(&err, BuildLogError::StructuralMismatch(msg) if msg.contains("IDECommandLineBuildLoq")),
            "{err}"
        );
    }

    #[test]
    fn truncated_log_is_a_mismatch() {
        let text = sample_log(11).to_slf();
        let tokens = tokenize(&text).unwrap();
        let err = parse_activity_log(&tokens[..tokens.len() / 2]).unwrap_err();
        assert!(
            matches!(&err, BuildLogError::StructuralMismatch(msg) if msg.starts_with("log ended")),
            "{err}"
        );
    }

    #[test]
    fn boolean_out_of_range_is_a_mismatch() {
        let mut w = SlfWriter::new();
        w.int(10)
            .class("IDEActivityLogSection")
            .int(0)
            .string("")
            .string("")
            .string("")
            .double(1.0)
            .double(2.0)
            .null()
            .string("")
            .null()
            .int(2);
        let text = w.finish();
        let err = parse(&text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected activity log structure: expected a boolean for was cancelled, found int(2)"
        );
    }

    #[test]
    fn empty_token_stream_has_no_version() {
        let err = parse_activity_log(&[]).unwrap_err();
        assert!(matches!(err, BuildLogError::StructuralMismatch(_)));
    }

    fn nested_sections(levels: usize) -> String {
        let mut w = SlfWriter::new();
        w.int(10);
        for _ in 0..levels {
            w.class("IDEActivityLogSection")
                .int(0)
                .string("")
                .string("Nested")
                .string("")
                .double(1.0)
                .double(2.0)
                .list(1);
        }
        w.finish()
    }

    #[test]
    fn deeply_nested_sections_are_a_mismatch() {
        let err = parse(&nested_sections(50_000)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected activity log structure: sections nested too deeply"
        );
    }

    #[test]
    fn nesting_within_limit_parses() {
        let mut section = LogSection {
            title: "Leaf",
            ..LogSection::default()
        };
        for _ in 0..MAX_NESTING - 1 {
            section = LogSection {
                title: "Nested",
                sub_sections: vec![section],
                ..LogSection::default()
            };
        }
        let text = ActivityLog {
            version: 10,
            main_section: section,
        }
        .to_slf();

        let mut parsed = &parse(&text).unwrap().main_section;
        let mut levels = 1;
        while let Some(child) = parsed.sub_sections.first() {
            parsed = child;
            levels += 1;
        }
        assert_eq!(levels, MAX_NESTING);
        assert_eq!(parsed.title, "Leaf");
    }
}
