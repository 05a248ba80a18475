//! protoc plugin envelope: `CodeGeneratorRequest` in, `CodeGeneratorResponse` out.

use std::io::{Read, Write};

use prost::Message;
use prost_types::compiler::code_generator_response::File;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Options;
use crate::session;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to read request: {0}")]
    Read(#[source] std::io::Error),
    #[error("can't unmarshal input: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("failed to write response: {0}")]
    Write(#[source] std::io::Error),
}

pub fn read_request(mut reader: impl Read) -> Result<CodeGeneratorRequest, PluginError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input).map_err(PluginError::Read)?;
    debug!(bytes = input.len(), "read code generator request");
    Ok(CodeGeneratorRequest::decode(input.as_slice())?)
}

/// Options after folding in the request's parameter string.
pub fn request_options(request: &CodeGeneratorRequest, mut options: Options) -> Options {
    options.apply_parameter(request.parameter());
    options
}

/// Run one request. Failures end up in `error`, never alongside files.
pub fn respond(request: &CodeGeneratorRequest, options: Options) -> CodeGeneratorResponse {
    let config = match options.resolve() {
        Ok(config) => config,
        Err(e) => return error_response(e.to_string()),
    };
    match session::generate(&request.proto_file, &request.file_to_generate, config) {
        Ok(documents) => CodeGeneratorResponse {
            file: documents
                .into_iter()
                .map(|document| File {
                    name: Some(document.name),
                    content: Some(document.content),
                    ..File::default()
                })
                .collect(),
            ..CodeGeneratorResponse::default()
        },
        Err(e) => {
            error!(error = %e, "conversion failed");
            error_response(e.to_string())
        }
    }
}

pub fn write_response(mut writer: impl Write, response: &CodeGeneratorResponse) -> Result<(), PluginError> {
    writer.write_all(&response.encode_to_vec()).map_err(PluginError::Write)?;
    writer.flush().map_err(PluginError::Write)
}

/// A response carrying only `message`.
pub fn error_response(message: String) -> CodeGeneratorResponse {
    CodeGeneratorResponse { error: Some(message), ..CodeGeneratorResponse::default() }
}
