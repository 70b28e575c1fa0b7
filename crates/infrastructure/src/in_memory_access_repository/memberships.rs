use super::*;

#[async_trait]
impl MembershipStore for InMemoryAccessRepository {
    async fn assign_role(&self, account_id: AccountId, role_id: RoleId) -> AppResult<()> {
        self.require_live_role(role_id).await?;

        self.memberships
            .write()
            .await
            .entry((account_id, role_id))
            .or_insert_with(|| RoleMembership::new(account_id, role_id));

        Ok(())
    }

    async fn revoke_role(&self, account_id: AccountId, role_id: RoleId) -> AppResult<()> {
        self.memberships
            .write()
            .await
            .remove(&(account_id, role_id));

        Ok(())
    }

    async fn list_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>> {
        let role_ids: Vec<RoleId> = {
            let memberships = self.memberships.read().await;
            memberships
                .keys()
                .filter(|(member_account_id, _)| *member_account_id == account_id)
                .map(|(_, role_id)| *role_id)
                .collect()
        };

        let roles = self.roles.read().await;
        let mut held: Vec<Role> = role_ids
            .into_iter()
            .filter_map(|role_id| {
                roles
                    .get(&role_id)
                    .filter(|role| !role.is_deleted())
                    .cloned()
            })
            .collect();
        held.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        Ok(held)
    }

    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<RoleMembership>> {
        let memberships = self.memberships.read().await;

        let mut members: Vec<RoleMembership> = memberships
            .values()
            .filter(|membership| membership.role_id() == role_id)
            .copied()
            .collect();
        members.sort_by_key(|membership| membership.account_id().as_uuid());

        Ok(members)
    }
}

#[async_trait]
impl AccessDirectory for InMemoryAccessRepository {
    async fn find_account_roles(&self, account_id: AccountId) -> AppResult<Vec<Role>> {
        self.list_account_roles(account_id).await
    }

    async fn find_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        Ok(self.collect_role_permissions(role_id).await)
    }
}
