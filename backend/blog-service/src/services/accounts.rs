/// Account service - registration, profiles and password changes
use chrono::Utc;
use crypto_core::{hash_password, validate_password_strength, verify_password};
use uuid::Uuid;
use validator::Validate;

use super::{required, ServiceContext};
use crate::authz::{enforce, Action, Resource, Role};
use crate::error::{AppError, Result};
use crate::models::{BlogDto, CommentDto, PasswordDto, User, UserDto};

#[derive(Clone)]
pub struct AccountService {
    ctx: ServiceContext,
}

/// Validated registration fields
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

fn validate_registration(dto: &UserDto) -> Result<Registration<'_>> {
    let username = required(&dto.user_name, "userName")?;
    let email = required(&dto.email, "email")?;
    let password = required(&dto.password, "password")?;
    dto.validate()?;
    validate_password_strength(password)?;

    Ok(Registration {
        username,
        email,
        password,
    })
}

impl AccountService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new account with the RegularUser role
    pub async fn register_regular_user(&self, dto: UserDto) -> Result<UserDto> {
        let registration = validate_registration(&dto)?;
        self.create_user(registration, Role::RegularUser).await
    }

    /// Register a moderator; only an admin may do this
    pub async fn register_moderator(&self, dto: UserDto, token: Option<&str>) -> Result<UserDto> {
        let registration = validate_registration(&dto)?;
        let actor = self.ctx.actor(token)?;
        enforce(
            &actor,
            &Resource::user(Uuid::new_v4(), Role::Moderator),
            Action::Create,
        )?;

        self.create_user(registration, Role::Moderator).await
    }

    async fn create_user(&self, reg: Registration<'_>, role: Role) -> Result<UserDto> {
        let users = &self.ctx.repos.users;

        if users.find_by_email(reg.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email {} is already taken",
                reg.email
            )));
        }
        if users.find_by_username(reg.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                reg.username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: reg.username.to_string(),
            email: reg.email.to_string(),
            password_hash: hash_password(reg.password)?,
            role,
            created_at: Utc::now(),
        };
        users.insert(&user).await?;

        tracing::info!(user_id = %user.id, role = %role, "user registered");
        Ok(user.into())
    }

    pub async fn get_all_regular_users(&self) -> Result<Vec<UserDto>> {
        let users = self.ctx.repos.users.get_by_role(Role::RegularUser).await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn get_all_moderators(&self) -> Result<Vec<UserDto>> {
        let users = self.ctx.repos.users.get_by_role(Role::Moderator).await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    /// Regular users followed by moderators; admins are not listed
    pub async fn get_all_users(&self) -> Result<Vec<UserDto>> {
        let mut users = self.get_all_regular_users().await?;
        users.extend(self.get_all_moderators().await?);
        Ok(users)
    }

    pub async fn get_user_by_id(&self, id: Uuid, token: Option<&str>) -> Result<UserDto> {
        let user = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::user(user.id, user.role), Action::Read)?;

        Ok(user.into())
    }

    pub async fn delete_user(&self, id: Uuid, token: Option<&str>) -> Result<()> {
        let user = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::user(user.id, user.role), Action::Delete)?;

        self.ctx.repos.users.delete(user.id).await?;
        tracing::info!(user_id = %user.id, by = %actor.subject_id, "user deleted");
        Ok(())
    }

    /// Change username and/or email; only the account holder may do this
    pub async fn update_user(&self, id: Uuid, dto: UserDto, token: Option<&str>) -> Result<UserDto> {
        if dto.user_name.is_none() && dto.email.is_none() {
            return Err(AppError::InvalidArgument(
                "userName or email is required".to_string(),
            ));
        }
        if dto.user_name.is_some() {
            required(&dto.user_name, "userName")?;
        }
        dto.validate()?;

        let mut user = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(&actor, &Resource::user(user.id, user.role), Action::Update)?;

        let users = &self.ctx.repos.users;

        if let Some(username) = dto.user_name.filter(|name| *name != user.username) {
            if users.find_by_username(&username).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Username {} is already taken",
                    username
                )));
            }
            user.username = username;
        }

        if let Some(email) = dto.email.filter(|email| *email != user.email) {
            if users.find_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict(format!("Email {} is already taken", email)));
            }
            user.email = email;
        }

        users.update(&user).await?;
        Ok(user.into())
    }

    pub async fn change_password(
        &self,
        id: Uuid,
        dto: PasswordDto,
        token: Option<&str>,
    ) -> Result<()> {
        let old_password = required(&dto.old_password, "oldPassword")?;
        let new_password = required(&dto.new_password, "newPassword")?;

        let mut user = self.load(id).await?;
        let actor = self.ctx.actor(token)?;
        enforce(
            &actor,
            &Resource::user(user.id, user.role),
            Action::ChangePassword,
        )?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(AppError::InvalidArgument(
                "Old password is incorrect".to_string(),
            ));
        }

        user.password_hash = hash_password(new_password)?;
        self.ctx.repos.users.update(&user).await?;

        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }

    pub async fn get_all_blogs_by_user_id(&self, id: Uuid) -> Result<Vec<BlogDto>> {
        let user = self.load(id).await?;
        let blogs = self.ctx.repos.blogs.get_by_owner(user.id).await?;

        Ok(blogs
            .into_iter()
            .map(|blog| BlogDto {
                owner_username: Some(user.username.clone()),
                ..BlogDto::from(blog)
            })
            .collect())
    }

    pub async fn get_all_comments_by_user_id(&self, id: Uuid) -> Result<Vec<CommentDto>> {
        let user = self.load(id).await?;
        let comments = self.ctx.repos.comments.get_by_user(user.id).await?;

        Ok(comments
            .into_iter()
            .map(|comment| CommentDto {
                creator_username: Some(user.username.clone()),
                ..CommentDto::from(comment)
            })
            .collect())
    }

    async fn load(&self, id: Uuid) -> Result<User> {
        self.ctx
            .repos
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }
}
