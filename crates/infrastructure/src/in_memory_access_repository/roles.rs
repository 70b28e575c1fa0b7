use super::*;

#[async_trait]
impl RoleStore for InMemoryAccessRepository {
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        let name_taken = roles
            .values()
            .any(|role| !role.is_deleted() && role.name() == &input.name);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let role = Role::new(input.name, input.description);
        roles.insert(role.id(), role.clone());

        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        let name_taken = roles
            .values()
            .any(|role| role.id() != role_id && !role.is_deleted() && role.name() == &input.name);
        if name_taken {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let Some(role) = roles.get_mut(&role_id) else {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        };
        if role.is_deleted() {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        }

        role.rename(input.name);
        role.set_description(input.description);

        Ok(role.clone())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Role> {
        let roles = self.roles.read().await;

        roles
            .get(&role_id)
            .filter(|role| !role.is_deleted())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<Role>> {
        let roles = self.roles.read().await;

        Ok(roles
            .values()
            .find(|role| !role.is_deleted() && role.name() == name)
            .cloned())
    }

    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let granting: Option<HashSet<RoleId>> = match query.granting_permission {
            Some(permission_id) => {
                let grants = self.grants.read().await;
                Some(
                    grants
                        .iter()
                        .filter(|grant| grant.permission_id() == permission_id)
                        .map(RoleGrant::role_id)
                        .collect(),
                )
            }
            None => None,
        };

        let roles = self.roles.read().await;
        let mut listed: Vec<Role> = roles
            .values()
            .filter(|role| {
                (query.include_deleted || !role.is_deleted())
                    && granting
                        .as_ref()
                        .map(|ids| ids.contains(&role.id()))
                        .unwrap_or(true)
                    && query
                        .search
                        .as_deref()
                        .map(|search| {
                            matches_search(role.name().as_str(), role.description(), search)
                        })
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        Ok(listed
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        let Some(role) = roles.get_mut(&role_id) else {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        };
        if role.is_deleted() {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        }

        role.mark_deleted();
        Ok(())
    }

    async fn restore_role(&self, role_id: RoleId) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        let restored_name = match roles.get(&role_id) {
            Some(role) if role.is_deleted() => role.name().clone(),
            _ => {
                return Err(AppError::NotFound(format!(
                    "soft-deleted role '{role_id}' was not found"
                )));
            }
        };

        let name_taken = roles.values().any(|role| {
            role.id() != role_id && !role.is_deleted() && role.name() == &restored_name
        });
        if name_taken {
            return Err(AppError::Conflict(format!(
                "role '{restored_name}' already exists"
            )));
        }

        let Some(role) = roles.get_mut(&role_id) else {
            return Err(AppError::NotFound(format!(
                "soft-deleted role '{role_id}' was not found"
            )));
        };
        role.restore();

        Ok(role.clone())
    }

    async fn force_delete_role(&self, role_id: RoleId) -> AppResult<Role> {
        let removed = {
            let mut roles = self.roles.write().await;
            roles
                .remove(&role_id)
                .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?
        };

        self.grants
            .write()
            .await
            .retain(|grant| grant.role_id() != role_id);
        self.memberships
            .write()
            .await
            .retain(|(_, member_role_id), _| *member_role_id != role_id);

        Ok(removed)
    }

    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_live_role(role_id).await?;
        self.require_live_permission(permission_id).await?;

        self.grants
            .write()
            .await
            .insert(RoleGrant::new(role_id, permission_id));

        Ok(())
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.grants
            .write()
            .await
            .remove(&RoleGrant::new(role_id, permission_id));

        Ok(())
    }

    async fn replace_grants(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        self.require_live_role(role_id).await?;
        for permission_id in &permission_ids {
            self.require_live_permission(*permission_id).await?;
        }

        let mut grants = self.grants.write().await;
        grants.retain(|grant| grant.role_id() != role_id);
        for permission_id in permission_ids {
            grants.insert(RoleGrant::new(role_id, permission_id));
        }

        Ok(())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        self.require_live_role(role_id).await?;

        Ok(self.collect_role_permissions(role_id).await)
    }
}
