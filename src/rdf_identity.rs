// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::LazyLock;

use regex::Regex;
use sophia_api::{source::TripleSource, term::Term, triple::Triple};
use sophia_turtle::parser::turtle;
use url::Url;

use crate::{error::ValidationError, model::record_identity::RecordIdentity};

/// The Dublin Core Terms `identifier` predicate
pub const DCTERMS_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";

pub static RE_TTL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.ttl$").unwrap());

/// Finds the canonical subject of an RDF (Turtle) record:
/// the first IRI (in document order) that is the subject
/// of a `dcterms:identifier` triple.
///
/// # Errors
///
/// - the content is not valid Turtle
/// - no IRI subject has a `dcterms:identifier`
pub fn find_subject_uri(rdf_text: &str) -> Result<String, ValidationError> {
    let mut subject_uri = None;
    turtle::parse_str(rdf_text)
        .for_each_triple(|triple| {
            if subject_uri.is_some() {
                return;
            }
            let is_identifier = triple
                .p()
                .iri()
                .is_some_and(|pred| pred.as_str() == DCTERMS_IDENTIFIER);
            if is_identifier {
                subject_uri = triple.s().iri().map(|subj| subj.as_str().to_owned());
            }
        })
        .map_err(|err| ValidationError::InvalidRdfSyntax(err.to_string()))?;

    subject_uri.ok_or(ValidationError::MissingIdentifier)
}

/// Derives record-ID and category from the path of a subject URI,
/// e.g. `https://example.org/records/survey/item123.ttl`
/// yields record-ID `item123` and category `survey`.
///
/// # Errors
///
/// - `subject_uri` is not an absolute, hierarchical URL
/// - its path has less then two non-empty segments
/// - the record-ID would be empty
pub fn identity_from_uri(subject_uri: &str) -> Result<RecordIdentity, ValidationError> {
    let malformed = || ValidationError::MalformedUriPath(subject_uri.to_owned());
    let parsed_url = Url::parse(subject_uri).map_err(|_err| malformed())?;
    // segments arrive percent-encoded, and get encoded again for the contents API
    let path_parts = parsed_url
        .path_segments()
        .ok_or_else(malformed)?
        .filter(|part| !part.is_empty())
        .map(urlencoding::decode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_err| malformed())?;
    if path_parts.len() < 2 {
        return Err(malformed());
    }

    let file_name = &path_parts[path_parts.len() - 1];
    let category = path_parts[path_parts.len() - 2].trim_end_matches('/');
    let record_id = RE_TTL_SUFFIX.replace(file_name, "");
    if record_id.is_empty() || category.is_empty() {
        return Err(malformed());
    }

    Ok(RecordIdentity::new(record_id, category, subject_uri))
}

/// Extracts the identity of an RDF (Turtle) record.
///
/// This is a pure function; it does no I/O.
///
/// # Errors
///
/// See [`find_subject_uri`] and [`identity_from_uri`].
pub fn extract_identity(rdf_text: &str) -> Result<RecordIdentity, ValidationError> {
    let subject_uri = find_subject_uri(rdf_text)?;
    identity_from_uri(&subject_uri)
}
