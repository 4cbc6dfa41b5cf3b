use super::utils::whole_days_between;
use super::{PartialRuleResult, PolicyRule, RuleContext, RuleError, RuleInit};
use crate::model::ResolvedUser;
use async_trait::async_trait;
use orgguard_types::ids;
use serde::Deserialize;

/// Flags users that logged in with the `Other Apex API` login type.
pub struct NoOtherApexApiLogins {
    name: String,
}

impl NoOtherApexApiLogins {
    pub fn new(init: RuleInit) -> Self {
        Self {
            name: init.display_name,
        }
    }

    pub fn boxed(init: RuleInit) -> Box<dyn PolicyRule<ResolvedUser>> {
        Box::new(Self::new(init))
    }
}

#[async_trait]
impl PolicyRule<ResolvedUser> for NoOtherApexApiLogins {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedUser>,
    ) -> Result<PartialRuleResult, RuleError> {
        let mut out = PartialRuleResult::new(&self.name);

        for (id, user) in ctx.entities {
            let forbidden = user
                .logins
                .iter()
                .filter(|l| l.login_type == ids::LOGIN_TYPE_OTHER_APEX_API);
            for login in forbidden {
                let message = match login.application.as_deref() {
                    Some(app) => format!(
                        "User logged in {} time(s) with login type {} using {app}.",
                        login.count,
                        ids::LOGIN_TYPE_OTHER_APEX_API
                    ),
                    None => format!(
                        "User logged in {} time(s) with login type {}.",
                        login.count,
                        ids::LOGIN_TYPE_OTHER_APEX_API
                    ),
                };
                out.violation([id.as_str(), ids::LOGIN_TYPE_OTHER_APEX_API], message);
            }
        }

        Ok(out)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InactiveUsersOptions {
    #[serde(default = "default_days_threshold")]
    pub days_threshold: u32,
}

fn default_days_threshold() -> u32 {
    90
}

impl Default for InactiveUsersOptions {
    fn default() -> Self {
        Self {
            days_threshold: default_days_threshold(),
        }
    }
}

/// Flags users that never logged in or have been inactive longer than the threshold.
pub struct NoInactiveUsers {
    name: String,
    options: Result<InactiveUsersOptions, RuleError>,
}

impl NoInactiveUsers {
    pub fn new(init: RuleInit) -> Self {
        let options = init.options::<InactiveUsersOptions>();
        Self {
            name: init.display_name,
            options,
        }
    }

    pub fn boxed(init: RuleInit) -> Box<dyn PolicyRule<ResolvedUser>> {
        Box::new(Self::new(init))
    }
}

#[async_trait]
impl PolicyRule<ResolvedUser> for NoInactiveUsers {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        ctx: &RuleContext<'_, ResolvedUser>,
    ) -> Result<PartialRuleResult, RuleError> {
        let options = self.options.clone()?;
        let threshold = i64::from(options.days_threshold);
        let mut out = PartialRuleResult::new(&self.name);

        for (id, user) in ctx.entities {
            match user.last_login {
                None => {
                    // Accounts younger than the threshold get a grace period.
                    let age = whole_days_between(ctx.now, user.created_date);
                    if age > threshold {
                        out.violation(
                            [id.as_str()],
                            format!("User has never logged in (created {age} days ago)."),
                        );
                    }
                }
                Some(last_login) => {
                    let idle = whole_days_between(ctx.now, last_login);
                    if idle > threshold {
                        out.violation(
                            [id.as_str()],
                            format!(
                                "User inactive since {idle} days (threshold is {threshold} days)."
                            ),
                        );
                    }
                }
            }
        }

        Ok(out)
    }
}
