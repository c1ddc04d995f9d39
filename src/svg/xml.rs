//! quick-xml plumbing shared by the recolor pass and text layout.

use std::fmt::Display;

use quick_xml::Writer;
use quick_xml::events::Event;

use crate::error::{DesignerError, DesignerResult};

pub(crate) fn xml_error(err: impl Display) -> DesignerError {
    DesignerError::InvalidSvg(err.to_string())
}

pub(crate) fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> DesignerResult<()> {
    writer.write_event(event).map_err(xml_error)
}

pub(crate) fn into_string(writer: Writer<Vec<u8>>) -> DesignerResult<String> {
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}
