/// Tag service - read-only tag lookups
use super::ServiceContext;
use crate::error::{AppError, Result};
use crate::models::TagDto;

#[derive(Clone)]
pub struct TagService {
    ctx: ServiceContext,
}

impl TagService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn get_all_tags(&self) -> Result<Vec<TagDto>> {
        let tags = self.ctx.repos.tags.get_all().await?;
        Ok(tags.into_iter().map(TagDto::from).collect())
    }

    pub async fn get_tag_by_id(&self, id: i64) -> Result<TagDto> {
        self.ctx
            .repos
            .tags
            .get_by_id(id)
            .await?
            .map(TagDto::from)
            .ok_or_else(|| AppError::not_found("Tag", id))
    }
}
