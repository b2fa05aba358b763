#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_command_exists() {
        // Test with a command that should exist on most systems
        #[cfg(unix)]
        {
            assert!(command_exists("ls"));
            assert!(!command_exists("nonexistent_command_12345"));
        }

        #[cfg(windows)]
        {
            assert!(command_exists("cmd"));
            assert!(!command_exists("nonexistent_command_12345"));
        }
    }

    #[test]
    fn test_is_port_in_use() {
        // Port 0 is special and should not be in use
        assert!(!is_port_in_use(0));

        // Bind to a port and check it's in use
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(is_port_in_use(port));
    }

    #[tokio::test]
    async fn test_endpoint_ready_false_when_nothing_listens() {
        assert!(!endpoint_ready("127.0.0.1", 65432).await);
    }

    #[tokio::test]
    async fn test_wait_for_endpoint_times_out() {
        let result = wait_for_endpoint("127.0.0.1", 65431, Duration::from_millis(200)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_launcher_default_has_no_overrides() {
        let launcher = ChromeLauncher::default();
        assert!(launcher.chrome_path.is_none());
        assert!(launcher.user_data_dir.is_none());
    }
}
