//! Concurrent evaluation against one shared engine.

use std::sync::Arc;

use warden_engine::{
    AuditDetail, Bootstrap, EngineSettings, FeatureOptions, MemoryAuditSink, Principal, ResolveError,
    Resource, ResourceDefinition, RoleCatalog, RoleDefinition, RoleGrant, RootOptions,
};

struct Account {
    account_id: String,
    owner_id: String,
}

impl Resource for Account {
    fn fields() -> &'static [&'static str] {
        &["account_id", "owner_id"]
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "account_id" => Some(self.account_id.clone()),
            "owner_id" => Some(self.owner_id.clone()),
            _ => None,
        }
    }
}

fn resolve(user_id: &String) -> Result<Option<Principal>, ResolveError> {
    Ok(Some(Principal::new(user_id.clone(), "HOLDER")))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_scopes_do_not_share_context() {
    let sink = Arc::new(MemoryAuditSink::new());
    let root = RootOptions::new(
        RoleCatalog::new().with_role("HOLDER", RoleDefinition::new(1)),
        "HOLDER",
        resolve,
    )
    .resource("Account")
    .logging(true)
    .sink(sink.clone());

    let warden = Bootstrap::with_settings(root, &EngineSettings::default())
        .unwrap()
        .feature(
            FeatureOptions::new().resource(
                "Account",
                ResourceDefinition::<Principal, Account>::new("account_id")
                    .action("READ")
                    .access_level("OWN", 0, |ctx: &Principal, account: &Account| {
                        ctx.user_id == account.owner_id
                    })
                    .role("HOLDER", RoleGrant::new().permit("READ", ["OWN"])),
            ),
        )
        .unwrap()
        .finish();

    let mut handles = Vec::new();
    for n in 0..64 {
        let warden = warden.clone();
        handles.push(tokio::spawn(async move {
            let user_id = format!("user-{n}");
            let scope = warden.resolve_scope(&user_id).unwrap();
            let own = Account {
                account_id: format!("acct-{n}"),
                owner_id: user_id.clone(),
            };
            let other = Account {
                account_id: format!("acct-{}", n + 1000),
                owner_id: format!("user-{}", n + 1000),
            };

            tokio::task::yield_now().await;

            let allowed = scope.can("Account", "READ", &own).is_ok();
            let denied = scope.can("Account", "READ", &other).is_err();
            assert_eq!(scope.context().unwrap().user_id, user_id);
            (allowed, denied)
        }));
    }

    for handle in handles {
        let (allowed, denied) = handle.await.unwrap();
        assert!(allowed);
        assert!(denied);
    }

    let records = sink.records();
    assert_eq!(records.len(), 128);
    for record in &records {
        let AuditDetail::Can {
            resource_id: Some(account_id),
            ..
        } = &record.detail
        else {
            panic!("unexpected detail: {:?}", record.detail);
        };
        // An allowed record names the caller's own account; a denied one does not.
        let own = account_id.trim_start_matches("acct-") == record.user_id.trim_start_matches("user-");
        assert_eq!(own, record.is_allowed());
    }
}
