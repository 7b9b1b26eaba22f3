//! Captured scan tool outputs.

/// `ss -tlnp` on a dev box: dual-stack sshd, CUPS without pid access, a vite
/// server, an ad-hoc python server, the gateway and two unowned high ports.
pub const SS_OUTPUT: &str = r#"State  Recv-Q Send-Q Local Address:Port  Peer Address:Port Process
LISTEN 0      128          0.0.0.0:22         0.0.0.0:*     users:(("sshd",pid=812,fd=3))
LISTEN 0      128             [::]:22            [::]:*     users:(("sshd",pid=812,fd=4))
LISTEN 0      4096       127.0.0.1:631        0.0.0.0:*
LISTEN 0      4096           [::1]:631           [::]:*
LISTEN 0      511          0.0.0.0:5173       0.0.0.0:*     users:(("node",pid=2201,fd=21))
LISTEN 0      5            0.0.0.0:8765       0.0.0.0:*     users:(("python3",pid=3100,fd=3))
LISTEN 0      511        127.0.0.1:18789      0.0.0.0:*     users:(("openclaw-gatewa",pid=4000,fd=25))
LISTEN 0      128          0.0.0.0:40000      0.0.0.0:*
LISTEN 0      128        127.0.0.1:36467      0.0.0.0:*
ESTAB  0      0       192.168.1.20:22     192.168.1.5:51122 users:(("sshd",pid=9000,fd=4))
"#;

/// `netstat -tlnp` run without root: some owners show as `-`.
pub const NETSTAT_OUTPUT: &str = r#"Active Internet connections (only servers)
Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name
tcp        0      0 0.0.0.0:22              0.0.0.0:*               LISTEN      812/sshd: /usr/sbin
tcp        0      0 127.0.0.1:6379          0.0.0.0:*               LISTEN      990/redis-server
tcp        0      0 0.0.0.0:3000            0.0.0.0:*               LISTEN      1500/node
tcp        0      0 0.0.0.0:33060           0.0.0.0:*               LISTEN      -
tcp6       0      0 :::22                   :::*                    LISTEN      812/sshd: /usr/sbin
tcp6       0      0 :::5432                 :::*                    LISTEN      -
"#;
