//! IAM role ARN synthesis and validation.

use std::sync::OnceLock;

use regex::Regex;

/// The region whose roles live in the `aws-cn` partition.
pub const CHINA_REGION: &str = "cn-north-1";

const ROLE_ARN_PATTERN: &str = r"^arn:(aws|aws-cn):iam::\d{12}:role/[\w+=,.@-]{1,64}$";

pub fn partition_for_region(region: &str) -> &'static str {
    if region == CHINA_REGION {
        "aws-cn"
    } else {
        "aws"
    }
}

/// Build `arn:<partition>:iam::<account>:role/<role>` for a bare role name.
pub fn build_role_arn(role_name: &str, account_id: &str, region: &str) -> String {
    format!(
        "arn:{}:iam::{}:role/{}",
        partition_for_region(region),
        account_id,
        role_name
    )
}

/// Advisory check that `arn` names an IAM role in the `aws` or `aws-cn` partition.
pub fn is_valid_role_arn(arn: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(ROLE_ARN_PATTERN).ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(arn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cn-north-1", "arn:aws-cn:iam::123456789012:role/X")]
    #[case("us-east-1", "arn:aws:iam::123456789012:role/X")]
    #[case("eu-west-1", "arn:aws:iam::123456789012:role/X")]
    #[case("cn-northwest-1", "arn:aws:iam::123456789012:role/X")]
    fn test_build_role_arn(#[case] region: &str, #[case] expected: &str) {
        assert_eq!(build_role_arn("X", "123456789012", region), expected);
    }

    #[rstest]
    #[case("arn:aws:iam::123456789012:role/MyRole", true)]
    #[case("arn:aws-cn:iam::123456789012:role/deploy+ci=1,a.b@c-d_e", true)]
    #[case("arn:aws:iam::12:role/MyRole", false)]
    #[case("arn:aws:iam::1234567890123:role/MyRole", false)]
    #[case("arn:aws-us-gov:iam::123456789012:role/MyRole", false)]
    #[case("arn:aws:iam::123456789012:user/MyUser", false)]
    #[case("arn:aws:iam::123456789012:role/", false)]
    #[case("arn:aws:iam::123456789012:role/path/MyRole", false)]
    fn test_is_valid_role_arn(#[case] arn: &str, #[case] expected: bool) {
        assert_eq!(is_valid_role_arn(arn), expected);
    }

    #[test]
    fn test_role_name_length_limit() {
        let at_limit = format!("arn:aws:iam::123456789012:role/{}", "r".repeat(64));
        let over_limit = format!("arn:aws:iam::123456789012:role/{}", "r".repeat(65));
        assert!(is_valid_role_arn(&at_limit));
        assert!(!is_valid_role_arn(&over_limit));
    }
}
