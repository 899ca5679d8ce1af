//! The packet model: one line of text on the wire, parsed and serialized.
//!
//! Line grammar (newline-delimited, one packet per line):
//!
//! ```text
//! Response: <integer-code> [SP <message>]
//! Command:  <verb> [SP <argument>]
//! ```
//!
//! A line whose first whitespace-delimited token is all digits is a
//! Response; any other non-empty line is a Command. Serialization is the
//! exact inverse of parsing: `parse(serialize(p)) == p` for every valid
//! packet whose fields contain no line terminators.

use std::fmt;

use crate::{ProtocolError, ResponseCode};

/// One line of the wire protocol.
///
/// Packets are ephemeral: constructed per line, dispatched or delivered,
/// then discarded.
///
/// Invariants, upheld by the constructors and by [`Packet::parse`]:
/// - a command verb is non-empty, matches `[A-Za-z][A-Za-z0-9]*`, and is
///   stored in ASCII uppercase (verbs are case-insensitive on the wire);
/// - arguments and messages are trimmed, contain no line terminators,
///   and are `None` rather than empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// A request for an action, sent by either peer at any time.
    Command {
        /// Uppercase verb token, e.g. `FIRE`.
        verb: String,
        /// Free text after the verb, if any.
        argument: Option<String>,
    },

    /// A reply to a command, or an unsolicited status (greeting, closure).
    Response {
        /// The numeric code.
        code: ResponseCode,
        /// Free text after the code, if any.
        message: Option<String>,
    },
}

impl Packet {
    /// Builds a command packet, normalizing the verb to uppercase.
    pub fn command(
        verb: &str,
        argument: Option<&str>,
    ) -> Result<Self, ProtocolError> {
        validate_verb(verb)?;
        Ok(Self::Command {
            verb: verb.to_ascii_uppercase(),
            argument: clean_text(argument)?,
        })
    }

    /// Builds a response packet.
    pub fn response(
        code: ResponseCode,
        message: Option<&str>,
    ) -> Result<Self, ProtocolError> {
        Ok(Self::Response {
            code,
            message: clean_text(message)?,
        })
    }

    /// Parses one line (without its terminator) into a packet.
    ///
    /// # Errors
    /// - [`ProtocolError::EmptyLine`] for empty or whitespace-only input
    /// - [`ProtocolError::MalformedCode`] / [`ProtocolError::UnknownCode`]
    ///   for a response-shaped line with a bad code
    /// - [`ProtocolError::InvalidVerb`] for an ill-formed verb token
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::EmptyLine);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let tail = (!rest.is_empty()).then(|| rest.to_string());

        if head.bytes().all(|b| b.is_ascii_digit()) {
            let number: u16 = head
                .parse()
                .map_err(|_| ProtocolError::MalformedCode(head.to_string()))?;
            let code = ResponseCode::from_code(number)
                .ok_or(ProtocolError::UnknownCode(number))?;
            Ok(Self::Response {
                code,
                message: tail,
            })
        } else {
            validate_verb(head)?;
            Ok(Self::Command {
                verb: head.to_ascii_uppercase(),
                argument: tail,
            })
        }
    }

    /// True if this packet is a response.
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response { .. })
    }
}

/// Serialization — the exact inverse of [`Packet::parse`]. The trailing
/// text is omitted entirely (not just empty) when the field is `None`.
impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command {
                verb,
                argument: Some(argument),
            } => write!(f, "{verb} {argument}"),
            Self::Command {
                verb,
                argument: None,
            } => write!(f, "{verb}"),
            Self::Response {
                code,
                message: Some(message),
            } => write!(f, "{code} {message}"),
            Self::Response {
                code,
                message: None,
            } => write!(f, "{code}"),
        }
    }
}

fn validate_verb(verb: &str) -> Result<(), ProtocolError> {
    let mut bytes = verb.bytes();
    let ok = match bytes.next() {
        Some(first) => {
            first.is_ascii_alphabetic()
                && bytes.all(|b| b.is_ascii_alphanumeric())
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ProtocolError::InvalidVerb(verb.to_string()))
    }
}

/// Trims free text, maps empty to `None`, and rejects line terminators.
fn clean_text(text: Option<&str>) -> Result<Option<String>, ProtocolError> {
    match text {
        None => Ok(None),
        Some(text) => {
            if text.contains(['\r', '\n']) {
                return Err(ProtocolError::IllegalCharacter);
            }
            let text = text.trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Parsing
    // =====================================================================

    #[test]
    fn test_parse_command_with_argument() {
        let packet = Packet::parse("FIRE B7").unwrap();
        assert_eq!(
            packet,
            Packet::Command {
                verb: "FIRE".into(),
                argument: Some("B7".into()),
            }
        );
    }

    #[test]
    fn test_parse_command_without_argument() {
        let packet = Packet::parse("QUIT").unwrap();
        assert_eq!(
            packet,
            Packet::Command {
                verb: "QUIT".into(),
                argument: None,
            }
        );
    }

    #[test]
    fn test_parse_uppercases_the_verb() {
        let packet = Packet::parse("hello Alice").unwrap();
        assert_eq!(
            packet,
            Packet::Command {
                verb: "HELLO".into(),
                argument: Some("Alice".into()),
            }
        );
    }

    #[test]
    fn test_parse_trims_the_argument() {
        let packet = Packet::parse("FIRE   B7  ").unwrap();
        assert_eq!(
            packet,
            Packet::Command {
                verb: "FIRE".into(),
                argument: Some("B7".into()),
            }
        );
    }

    #[test]
    fn test_parse_response_with_message() {
        let packet = Packet::parse("100 BATTLESHIP/1.0").unwrap();
        assert_eq!(
            packet,
            Packet::Response {
                code: ResponseCode::VersionGreeting,
                message: Some("BATTLESHIP/1.0".into()),
            }
        );
    }

    #[test]
    fn test_parse_response_without_message() {
        let packet = Packet::parse("200").unwrap();
        assert_eq!(
            packet,
            Packet::Response {
                code: ResponseCode::Ok,
                message: None,
            }
        );
    }

    #[test]
    fn test_parse_empty_line_is_rejected() {
        assert_eq!(Packet::parse(""), Err(ProtocolError::EmptyLine));
        assert_eq!(Packet::parse("   "), Err(ProtocolError::EmptyLine));
    }

    #[test]
    fn test_parse_unknown_code_is_rejected() {
        assert_eq!(
            Packet::parse("299 something"),
            Err(ProtocolError::UnknownCode(299))
        );
    }

    #[test]
    fn test_parse_oversized_numeric_token_is_rejected() {
        // All digits but does not fit a u16.
        assert!(matches!(
            Packet::parse("4000000000 boom"),
            Err(ProtocolError::MalformedCode(_))
        ));
    }

    #[test]
    fn test_parse_illegal_verb_characters_are_rejected() {
        assert!(matches!(
            Packet::parse("FI*RE B7"),
            Err(ProtocolError::InvalidVerb(_))
        ));
        // Leading digit but not all digits: neither a code nor a verb.
        assert!(matches!(
            Packet::parse("1FIRE B7"),
            Err(ProtocolError::InvalidVerb(_))
        ));
    }

    // =====================================================================
    // Construction
    // =====================================================================

    #[test]
    fn test_command_constructor_normalizes_and_cleans() {
        let packet = Packet::command("fire", Some("  B7 ")).unwrap();
        assert_eq!(
            packet,
            Packet::Command {
                verb: "FIRE".into(),
                argument: Some("B7".into()),
            }
        );
    }

    #[test]
    fn test_command_constructor_maps_empty_argument_to_none() {
        let packet = Packet::command("QUIT", Some("   ")).unwrap();
        assert_eq!(
            packet,
            Packet::Command {
                verb: "QUIT".into(),
                argument: None,
            }
        );
    }

    #[test]
    fn test_constructors_reject_line_terminators() {
        assert_eq!(
            Packet::command("FIRE", Some("B7\nQUIT")),
            Err(ProtocolError::IllegalCharacter)
        );
        assert_eq!(
            Packet::response(ResponseCode::Ok, Some("hi\r\nthere")),
            Err(ProtocolError::IllegalCharacter)
        );
    }

    #[test]
    fn test_command_constructor_rejects_bad_verbs() {
        for verb in ["", "FI RE", "42", "FIRE!", "ПРИВЕТ"] {
            assert!(
                matches!(
                    Packet::command(verb, None),
                    Err(ProtocolError::InvalidVerb(_))
                ),
                "verb {verb:?}"
            );
        }
    }

    // =====================================================================
    // Round trips
    // =====================================================================

    #[test]
    fn test_round_trip_commands() {
        let packets = [
            Packet::command("HELLO", Some("Alice")).unwrap(),
            Packet::command("START", None).unwrap(),
            Packet::command("FIRE", Some("J10 good luck")).unwrap(),
        ];
        for packet in packets {
            let line = packet.to_string();
            assert_eq!(Packet::parse(&line).unwrap(), packet, "line {line:?}");
        }
    }

    #[test]
    fn test_round_trip_responses() {
        let packets = [
            Packet::response(ResponseCode::VersionGreeting, Some("BATTLESHIP/1.0"))
                .unwrap(),
            Packet::response(ResponseCode::Hit, None).unwrap(),
            Packet::response(ResponseCode::Sunk, Some("Destroyer")).unwrap(),
        ];
        for packet in packets {
            let line = packet.to_string();
            assert_eq!(Packet::parse(&line).unwrap(), packet, "line {line:?}");
        }
    }

    #[test]
    fn test_serialized_form_omits_missing_tail() {
        let quit = Packet::command("QUIT", None).unwrap();
        assert_eq!(quit.to_string(), "QUIT");

        let ok = Packet::response(ResponseCode::Ok, None).unwrap();
        assert_eq!(ok.to_string(), "200");
    }
}
