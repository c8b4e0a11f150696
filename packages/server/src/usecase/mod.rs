//! UseCase 層
//!
//! ドメインの trait にのみ依存し、Infrastructure 層の具体的な実装には依存しません。

mod authenticate;
mod error;
mod file;
mod send_message;

pub use authenticate::AuthenticateUseCase;
pub use error::{AuthError, FileError, SendMessageError};
pub use file::{GetFileUseCase, UploadFileUseCase};
pub use send_message::SendMessageUseCase;
