//! Files API snippets.

use genai_cookbook_types::content::{Content, Part, Role};
use genai_cookbook_types::files::File;

use super::{
    file_part, response_text, Snippets, BIG_BUCK_BUNNY_MP4, CAJUN_INSTRUMENTS_JPG,
    GENERATION_MODEL, POEM_TXT, SAMPLE_MP3, TEST_PDF,
};
use crate::error::{Error, Result};

impl Snippets<'_> {
    /// 上传文本文件并请求续写。
    pub async fn files_create_text(&self) -> Result<String> {
        let file = self.upload_media(POEM_TXT, "text/plain").await?;
        let parts = vec![
            Part::text("\n\nCan you add a few more lines to this poem?"),
            file_part(&file)?,
        ];
        self.generate_from_parts(parts).await
    }

    /// 上传图片并询问其中的乐器。
    pub async fn files_create_image(&self) -> Result<String> {
        let file = self.upload_media(CAJUN_INSTRUMENTS_JPG, "image/jpeg").await?;
        let parts = vec![
            file_part(&file)?,
            Part::text("\n\nCan you tell me about the instruments in this photo?"),
        ];
        self.generate_from_parts(parts).await
    }

    pub async fn files_create_audio(&self) -> Result<String> {
        let file = self.upload_media(SAMPLE_MP3, "audio/mpeg").await?;
        let parts = vec![file_part(&file)?, Part::text("Describe this audio clip")];
        self.generate_from_parts(parts).await
    }

    /// 上传视频，等待处理完成后再生成描述。
    pub async fn files_create_video(&self) -> Result<String> {
        let file = self
            .upload_media_and_wait(BIG_BUCK_BUNNY_MP4, "video/mp4")
            .await?;
        let parts = vec![file_part(&file)?, Part::text("Describe this video clip")];
        self.generate_from_parts(parts).await
    }

    pub async fn files_create_pdf(&self) -> Result<String> {
        let file = self.upload_media(TEST_PDF, "application/pdf").await?;
        let parts = vec![
            file_part(&file)?,
            Part::text("Give me a summary of this pdf file."),
        ];
        self.generate_from_parts(parts).await
    }

    /// 列出项目下全部文件名。
    pub async fn files_list(&self) -> Result<Vec<String>> {
        let files = self.client.files().all().await?;
        let names: Vec<String> = files.into_iter().filter_map(|file| file.name).collect();
        for name in &names {
            tracing::info!(name = %name, "file");
        }
        Ok(names)
    }

    /// 上传后按名称取回元数据。
    pub async fn files_get(&self) -> Result<File> {
        let uploaded = self.upload_media(POEM_TXT, "text/plain").await?;
        let name = uploaded.name.as_deref().ok_or_else(|| Error::Parse {
            message: "Upload response has no file name".into(),
        })?;
        let file = self.client.files().get(name).await?;
        tracing::info!(
            name = file.name.as_deref().unwrap_or_default(),
            mime_type = file.mime_type.as_deref().unwrap_or_default(),
            "retrieved file"
        );
        Ok(file)
    }

    /// 删除文件后再引用它，返回服务端给出的拒绝错误。
    ///
    /// 服务端仍然接受时返回 `Ok(None)`。
    pub async fn files_delete(&self) -> Result<Option<Error>> {
        let file = self.upload_media(POEM_TXT, "text/plain").await?;
        let part = file_part(&file)?;
        let name = file.name.as_deref().ok_or_else(|| Error::Parse {
            message: "Upload response has no file name".into(),
        })?;
        self.client.files().delete(name).await?;
        tracing::info!(name, "deleted file");

        let contents = vec![Content::from_parts(
            vec![part, Part::text("Describe this file.")],
            Role::User,
        )];
        match self
            .client
            .models()
            .generate_content(GENERATION_MODEL, contents)
            .await
        {
            Ok(_) => {
                tracing::warn!(name, "deleted file was still accepted");
                Ok(None)
            }
            Err(err) => {
                tracing::info!(name, error = %err, "deleted file rejected");
                Ok(Some(err))
            }
        }
    }

    async fn generate_from_parts(&self, parts: Vec<Part>) -> Result<String> {
        let contents = vec![Content::from_parts(parts, Role::User)];
        let response = self
            .client
            .models()
            .generate_content(GENERATION_MODEL, contents)
            .await?;
        let text = response_text(&response);
        tracing::info!(model = GENERATION_MODEL, "{text}");
        Ok(text)
    }
}
