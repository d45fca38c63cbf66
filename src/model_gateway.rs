use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::inputs::InputFile;
use crate::model::{GenerateRequest, GenerateResult, UploadedFile};
use crate::providers::gemini;

pub type ModelGatewayFuture<'a, T> = Pin<Box<dyn Future<Output = GenerateResult<T>> + 'a>>;

/// Remote operations the pipeline depends on.
pub trait ModelGateway {
    fn upload<'a>(&'a self, file: &'a InputFile) -> ModelGatewayFuture<'a, UploadedFile>;

    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> ModelGatewayFuture<'a, String>;
}

impl<T> ModelGateway for &T
where
    T: ModelGateway + ?Sized,
{
    fn upload<'a>(&'a self, file: &'a InputFile) -> ModelGatewayFuture<'a, UploadedFile> {
        (**self).upload(file)
    }

    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> ModelGatewayFuture<'a, String> {
        (**self).generate(request)
    }
}

pub struct HostModelGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HostModelGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl<'a> ModelGateway for HostModelGateway<'a> {
    fn upload<'b>(&'b self, file: &'b InputFile) -> ModelGatewayFuture<'b, UploadedFile> {
        Box::pin(async move { gemini::upload(self.client, self.cfg, file).await })
    }

    fn generate<'b>(&'b self, request: &'b GenerateRequest) -> ModelGatewayFuture<'b, String> {
        Box::pin(async move { gemini::generate(self.client, self.cfg, request).await })
    }
}
