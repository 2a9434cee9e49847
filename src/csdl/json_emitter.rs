//! Streaming JSON token writer.
//!
//! `serde_json` serializes whole values, while the CSDL-JSON writer emits a
//! document member by member as the model is walked. [`JsonEmitter`] keeps
//! the object/array nesting and drives a `serde_json` [`Formatter`] so the
//! output matches what `serde_json::to_writer` / `to_writer_pretty` produce.

use std::io::Write;

use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use crate::error::{CsdlError, Result};

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy)]
enum Scope {
    Object { first: bool, awaiting_value: bool },
    Array { first: bool },
}

pub struct JsonEmitter<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    scopes: Vec<Scope>,
}

impl<W: Write> JsonEmitter<W, CompactFormatter> {
    pub fn compact(writer: W) -> Self {
        Self::new(writer, CompactFormatter)
    }
}

impl<W: Write> JsonEmitter<W, PrettyFormatter<'static>> {
    pub fn pretty(writer: W) -> Self {
        Self::new(writer, PrettyFormatter::with_indent(b"  "))
    }
}

impl<W: Write, F: Formatter> JsonEmitter<W, F> {
    pub fn new(writer: W, formatter: F) -> Self {
        Self {
            writer,
            formatter,
            scopes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    pub fn start_object(&mut self) -> Result<()> {
        self.before_value()?;
        self.formatter.begin_object(&mut self.writer)?;
        self.scopes.push(Scope::Object {
            first: true,
            awaiting_value: false,
        });
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<()> {
        match self.scopes.pop() {
            Some(Scope::Object {
                awaiting_value: false,
                ..
            }) => {}
            other => {
                return Err(CsdlError::internal(format!(
                    "end_object called in scope {other:?}"
                )))
            }
        }
        self.formatter.end_object(&mut self.writer)?;
        self.after_value()
    }

    pub fn start_array(&mut self) -> Result<()> {
        self.before_value()?;
        self.formatter.begin_array(&mut self.writer)?;
        self.scopes.push(Scope::Array { first: true });
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<()> {
        match self.scopes.pop() {
            Some(Scope::Array { .. }) => {}
            other => {
                return Err(CsdlError::internal(format!(
                    "end_array called in scope {other:?}"
                )))
            }
        }
        self.formatter.end_array(&mut self.writer)?;
        self.after_value()
    }

    pub fn property_name(&mut self, name: &str) -> Result<()> {
        let Self {
            writer,
            formatter,
            scopes,
        } = self;
        match scopes.last_mut() {
            Some(Scope::Object {
                first,
                awaiting_value,
            }) if !*awaiting_value => {
                formatter.begin_object_key(writer, *first)?;
                serde_json::to_writer(&mut *writer, name)?;
                formatter.end_object_key(writer)?;
                *first = false;
                *awaiting_value = true;
                Ok(())
            }
            other => Err(CsdlError::internal(format!(
                "property name {name:?} written in scope {other:?}"
            ))),
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    pub fn string(&mut self, value: &str) -> Result<()> {
        self.before_value()?;
        serde_json::to_writer(&mut self.writer, value)?;
        self.after_value()
    }

    pub fn bool(&mut self, value: bool) -> Result<()> {
        self.before_value()?;
        self.formatter.write_bool(&mut self.writer, value)?;
        self.after_value()
    }

    pub fn null(&mut self) -> Result<()> {
        self.before_value()?;
        self.formatter.write_null(&mut self.writer)?;
        self.after_value()
    }

    pub fn i64(&mut self, value: i64) -> Result<()> {
        self.before_value()?;
        self.formatter.write_i64(&mut self.writer, value)?;
        self.after_value()
    }

    pub fn u32(&mut self, value: u32) -> Result<()> {
        self.before_value()?;
        self.formatter.write_u32(&mut self.writer, value)?;
        self.after_value()
    }

    /// Fails on infinities and NaN, which JSON numbers cannot represent
    pub fn f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(CsdlError::internal(format!(
                "non-finite number {value} cannot be written as JSON"
            )));
        }
        self.before_value()?;
        self.formatter.write_f64(&mut self.writer, value)?;
        self.after_value()
    }

    /// Writes an already validated numeric literal verbatim
    pub fn raw_number(&mut self, literal: &str) -> Result<()> {
        self.before_value()?;
        self.writer.write_all(literal.as_bytes())?;
        self.after_value()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn before_value(&mut self) -> Result<()> {
        let Self {
            writer,
            formatter,
            scopes,
        } = self;
        match scopes.last_mut() {
            None => Ok(()),
            Some(Scope::Array { first }) => {
                formatter.begin_array_value(writer, *first)?;
                *first = false;
                Ok(())
            }
            Some(Scope::Object {
                awaiting_value: true,
                ..
            }) => {
                formatter.begin_object_value(writer)?;
                Ok(())
            }
            Some(scope @ Scope::Object { .. }) => Err(CsdlError::internal(format!(
                "object value written without a property name in scope {scope:?}"
            ))),
        }
    }

    fn after_value(&mut self) -> Result<()> {
        let Self {
            writer,
            formatter,
            scopes,
        } = self;
        match scopes.last_mut() {
            None => {}
            Some(Scope::Array { .. }) => formatter.end_array_value(writer)?,
            Some(Scope::Object { awaiting_value, .. }) => {
                formatter.end_object_value(writer)?;
                *awaiting_value = false;
            }
        }
        Ok(())
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sample<F: Formatter>(emitter: &mut JsonEmitter<Vec<u8>, F>) -> Result<()> {
        emitter.start_object()?;
        emitter.property_name("$Version")?;
        emitter.string("4.0")?;
        emitter.property_name("list")?;
        emitter.start_array()?;
        emitter.i64(1)?;
        emitter.raw_number("2.50")?;
        emitter.start_object()?;
        emitter.end_object()?;
        emitter.end_array()?;
        emitter.property_name("empty")?;
        emitter.start_array()?;
        emitter.end_array()?;
        emitter.property_name("quote\"d")?;
        emitter.null()?;
        emitter.end_object()
    }

    #[test]
    fn test_compact_output() {
        let mut emitter = JsonEmitter::compact(Vec::new());
        write_sample(&mut emitter).unwrap();
        assert_eq!(
            String::from_utf8(emitter.into_inner()).unwrap(),
            r#"{"$Version":"4.0","list":[1,2.50,{}],"empty":[],"quote\"d":null}"#
        );
    }

    #[test]
    fn test_pretty_output() {
        let mut emitter = JsonEmitter::pretty(Vec::new());
        write_sample(&mut emitter).unwrap();
        assert_eq!(
            String::from_utf8(emitter.into_inner()).unwrap(),
            indoc::indoc!(
                r#"
                {
                  "$Version": "4.0",
                  "list": [
                    1,
                    2.50,
                    {}
                  ],
                  "empty": [],
                  "quote\"d": null
                }"#
            )
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut emitter = JsonEmitter::compact(Vec::new());
        assert!(emitter.f64(f64::INFINITY).is_err());
        assert!(emitter.f64(f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_value_without_name() {
        let mut emitter = JsonEmitter::compact(Vec::new());
        emitter.start_object().unwrap();
        assert!(emitter.string("x").is_err());
    }
}
